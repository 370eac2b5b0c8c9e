//! The Connector trait: durable storage for the flat record table.

use async_trait::async_trait;

use crate::{Error, Path, Record, Scalar};

/// Durable, sorted storage of (path, scalar) records.
///
/// Every operation works against the table as currently persisted: there is
/// no cache between calls. Writes are read-modify-write cycles of the whole
/// table; implementations serialize them so that concurrent `set`/`rem`
/// calls on one instance never lose each other's updates.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Connector>`.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Prepare the backing storage, creating it empty if it does not exist.
    async fn open(&mut self) -> Result<(), Error>;

    /// Release the store. Later operations fail with `Error::Closed`.
    async fn close(&mut self) -> Result<(), Error>;

    /// Load every record, sorted by path.
    async fn read_all(&self) -> Result<Vec<Record>, Error>;

    /// Upsert the record at exactly `path`.
    async fn set(&self, path: &Path, scalar: Scalar) -> Result<(), Error>;

    /// Delete the record at exactly `path`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if no record has that path.
    async fn rem(&self, path: &Path) -> Result<(), Error>;

    /// All records under `prefix` (including `prefix` itself), sorted.
    async fn get(&self, prefix: &Path) -> Result<Vec<Record>, Error> {
        let mut records = self.read_all().await?;
        records.retain(|record| record.path.has_prefix(prefix));
        Ok(records)
    }

    /// The paths under `prefix`, from a snapshot taken now.
    ///
    /// Each call re-reads the table, so the result can be requested again to
    /// see later writes.
    async fn iter_paths(&self, prefix: &Path) -> Result<Paths, Error> {
        let records = self.get(prefix).await?;
        Ok(Paths {
            inner: records
                .into_iter()
                .map(|record| record.path)
                .collect::<Vec<_>>()
                .into_iter(),
        })
    }
}

/// Iterator over stored paths, returned by [`Connector::iter_paths`].
#[derive(Debug)]
pub struct Paths {
    inner: std::vec::IntoIter<Path>,
}

impl Iterator for Paths {
    type Item = Path;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Paths {}

// Blanket implementation for boxes

#[async_trait]
impl<T: Connector + ?Sized> Connector for Box<T> {
    async fn open(&mut self) -> Result<(), Error> {
        self.as_mut().open().await
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.as_mut().close().await
    }

    async fn read_all(&self) -> Result<Vec<Record>, Error> {
        self.as_ref().read_all().await
    }

    async fn set(&self, path: &Path, scalar: Scalar) -> Result<(), Error> {
        self.as_ref().set(path, scalar).await
    }

    async fn rem(&self, path: &Path) -> Result<(), Error> {
        self.as_ref().rem(path).await
    }

    async fn get(&self, prefix: &Path) -> Result<Vec<Record>, Error> {
        self.as_ref().get(prefix).await
    }

    async fn iter_paths(&self, prefix: &Path) -> Result<Paths, Error> {
        self.as_ref().iter_paths(prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Minimal connector relying on the provided `get`/`iter_paths`.
    struct TestConnector {
        table: Mutex<BTreeMap<Path, Scalar>>,
    }

    impl TestConnector {
        fn new() -> Self {
            Self {
                table: Mutex::new(BTreeMap::new()),
            }
        }
    }

    #[async_trait]
    impl Connector for TestConnector {
        async fn open(&mut self) -> Result<(), Error> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), Error> {
            Ok(())
        }

        async fn read_all(&self) -> Result<Vec<Record>, Error> {
            let table = self.table.lock().unwrap();
            Ok(table
                .iter()
                .map(|(path, scalar)| Record::new(path.clone(), scalar.clone()))
                .collect())
        }

        async fn set(&self, path: &Path, scalar: Scalar) -> Result<(), Error> {
            self.table.lock().unwrap().insert(path.clone(), scalar);
            Ok(())
        }

        async fn rem(&self, path: &Path) -> Result<(), Error> {
            self.table
                .lock()
                .unwrap()
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(path))
        }
    }

    #[tokio::test]
    async fn provided_get_filters_by_prefix() {
        let store = TestConnector::new();
        store.set(&path!("a.b"), Scalar::from(1i64)).await.unwrap();
        store.set(&path!("a.bc"), Scalar::from(2i64)).await.unwrap();
        store.set(&path!("a.b.[0]"), Scalar::from(3i64)).await.unwrap();

        let records = store.get(&path!("a.b")).await.unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.b", "a.b.[0]"]);
    }

    #[tokio::test]
    async fn iter_paths_is_restartable() {
        let store = TestConnector::new();
        store.set(&path!("x.y"), Scalar::Null).await.unwrap();

        let first: Vec<Path> = store.iter_paths(&path!("x")).await.unwrap().collect();
        assert_eq!(first, vec![path!("x.y")]);

        store.set(&path!("x.z"), Scalar::Null).await.unwrap();
        let second = store.iter_paths(&path!("x")).await.unwrap();
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn object_safety_works() {
        let mut boxed: Box<dyn Connector> = Box::new(TestConnector::new());
        boxed.open().await.unwrap();
        boxed.set(&path!("k"), Scalar::from("v")).await.unwrap();
        assert_eq!(boxed.get(&path!("k")).await.unwrap().len(), 1);
        assert!(boxed.rem(&path!("missing")).await.unwrap_err().is_not_found());
    }
}
