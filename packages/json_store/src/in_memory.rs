//! In-memory connector.
//!
//! Same contract as [`FlatFileStore`](crate::FlatFileStore) without the file:
//! useful for tests and for callers that only need the codec semantics.

use async_trait::async_trait;
use tokio::sync::Mutex;

use flatstore_core_store::{normalize, Connector, Error, Path, Record, Scalar};

/// A sorted record table held in memory.
///
/// # Example
///
/// ```rust
/// use flatstore_json_store::InMemoryStore;
/// use flatstore_core_store::{path, Connector, Scalar};
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// rt.block_on(async {
///     let mut store = InMemoryStore::new();
///     store.open().await.unwrap();
///     store.set(&path!("name"), Scalar::from("Alice")).await.unwrap();
///     assert_eq!(store.get(&path!("name")).await.unwrap().len(), 1);
/// });
/// ```
pub struct InMemoryStore {
    records: Mutex<Vec<Record>>,
    is_open: bool,
}

impl InMemoryStore {
    /// Create a new empty in-memory store. It still has to be opened.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store holding `records`.
    pub fn with_records(mut records: Vec<Record>) -> Self {
        normalize(&mut records);
        Self {
            records: Mutex::new(records),
            is_open: false,
        }
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_open {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for InMemoryStore {
    async fn open(&mut self) -> Result<(), Error> {
        self.is_open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        self.is_open = false;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Record>, Error> {
        self.ensure_open()?;
        Ok(self.records.lock().await.clone())
    }

    async fn set(&self, path: &Path, scalar: Scalar) -> Result<(), Error> {
        self.ensure_open()?;
        let mut records = self.records.lock().await;
        match records.binary_search_by(|record| record.path.cmp(path)) {
            Ok(i) => records[i].scalar = scalar,
            Err(i) => records.insert(i, Record::new(path.clone(), scalar)),
        }
        Ok(())
    }

    async fn rem(&self, path: &Path) -> Result<(), Error> {
        self.ensure_open()?;
        let mut records = self.records.lock().await;
        match records.binary_search_by(|record| record.path.cmp(path)) {
            Ok(i) => {
                records.remove(i);
                Ok(())
            }
            Err(_) => Err(Error::not_found(path)),
        }
    }
}
