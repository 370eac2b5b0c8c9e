use std::io::{self, Write};
use std::path::{Path as FsPath, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use flatstore_core_store::{Connector, Error, Path, Record, Scalar};

use crate::config::StoreConfig;
use crate::json_utils;

/// Flat record table persisted as one JSON object in one file.
///
/// Every operation re-reads the file. `set` and `rem` hold a per-instance
/// write lock across their read-modify-write cycle and replace the file by
/// renaming a fully written temporary file over it, so readers never see a
/// half-written table.
///
/// Two instances pointed at the same file do not coordinate with each other.
pub struct FlatFileStore {
    config: StoreConfig,
    is_open: bool,
    write_lock: Mutex<()>,
}

impl FlatFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            is_open: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `path` with the default indentation.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn file_path(&self) -> &FsPath {
        &self.config.path
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_open {
            Ok(())
        } else {
            Err(Error::Closed)
        }
    }

    async fn load(&self) -> Result<Vec<Record>, Error> {
        log::debug!("Reading {}...", self.config.path.display());
        let bytes = tokio::fs::read(&self.config.path).await?;
        json_utils::decode_table(&bytes)
    }

    async fn persist(&self, records: &[Record]) -> Result<(), Error> {
        let bytes = json_utils::encode_table(records, self.config.indent)?;
        let target = self.config.path.clone();

        log::debug!(
            "Writing {} ({} records)...",
            target.display(),
            records.len()
        );
        tokio::task::spawn_blocking(move || replace_file(&target, &bytes))
            .await
            .map_err(|e| Error::Io(io::Error::other(e)))??;
        Ok(())
    }
}

/// Write `bytes` to a temporary file next to `target`, then rename it over
/// `target`. An existing `target` keeps its permissions.
fn replace_file(target: &FsPath, bytes: &[u8]) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => FsPath::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    match std::fs::metadata(target) {
        Ok(meta) => temp.as_file().set_permissions(meta.permissions())?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl Connector for FlatFileStore {
    async fn open(&mut self) -> Result<(), Error> {
        let path = self.config.path.clone();

        match tokio::fs::metadata(&path).await {
            Ok(attr) if !attr.is_file() => {
                return Err(Error::Io(io::Error::other(format!(
                    "store path {} is not a file",
                    path.display()
                ))));
            }
            Ok(_) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::info!("Creating empty store at {}", path.display());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                self.persist(&[]).await?;
            }
            Err(error) => return Err(Error::Io(error)),
        }

        // Surface a corrupt table now rather than on first use.
        let records = self.load().await?;
        self.is_open = true;
        log::info!(
            "Opened store {} ({} records)",
            path.display(),
            records.len()
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        // Wait out any write still holding the lock.
        let _guard = self.write_lock.lock().await;
        self.is_open = false;
        log::info!("Store {} closed.", self.config.path.display());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Record>, Error> {
        self.ensure_open()?;
        self.load().await
    }

    async fn set(&self, path: &Path, scalar: Scalar) -> Result<(), Error> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        match records.binary_search_by(|record| record.path.cmp(path)) {
            Ok(i) => records[i].scalar = scalar,
            Err(i) => records.insert(i, Record::new(path.clone(), scalar)),
        }
        self.persist(&records).await
    }

    async fn rem(&self, path: &Path) -> Result<(), Error> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        match records.binary_search_by(|record| record.path.cmp(path)) {
            Ok(i) => {
                records.remove(i);
                self.persist(&records).await
            }
            Err(_) => {
                log::warn!("No record at {} to remove", path);
                Err(Error::not_found(path))
            }
        }
    }
}
