//! The document facade: whole values in and out of a flat connector.

use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;

use flatstore_core_store::{flatten, reconstruct, Connector, Error, Path, Value};

use crate::convert::{from_value, to_value};
use crate::model::{self, Model};

/// Whole-value access to a [`Connector`].
///
/// `set` flattens a value and writes every resulting record concurrently;
/// `get` reads every record under a path and rebuilds the value; `rem`
/// deletes every record under a path. A failed write in the middle of a
/// `set` or `rem` is not rolled back: records already written stay written.
///
/// # Example
///
/// ```rust,ignore
/// use flatstore_serde_store::Document;
/// use flatstore_json_store::FlatFileStore;
/// use flatstore_core_store::{path, Value};
///
/// let doc = Document::open(FlatFileStore::at("file_db.json")).await?;
/// doc.set(&path!("a.b"), &Value::from(vec![2i64, 3])).await?;
/// assert_eq!(doc.get(&path!("a.b")).await?, Value::from(vec![2i64, 3]));
/// doc.close().await?;
/// ```
pub struct Document<C> {
    connector: C,
}

impl<C: Connector> Document<C> {
    /// Open `connector` and take ownership of it.
    pub async fn open(mut connector: C) -> Result<Self, Error> {
        connector.open().await?;
        Ok(Self { connector })
    }

    /// Close the connector, ending the document's lifetime.
    pub async fn close(mut self) -> Result<(), Error> {
        self.connector.close().await
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Rebuild the value stored under `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored under `path`; `AmbiguousContainer` if
    /// the stored records mix array and object children.
    pub async fn get(&self, path: &Path) -> Result<Value, Error> {
        let records = self.connector.get(path).await?;
        reconstruct(path, &records)?.ok_or_else(|| Error::not_found(path))
    }

    /// Write `value` at `path`, merging into whatever is already stored.
    ///
    /// Records under `path` that `value` does not mention are left alone;
    /// use [`replace`](Self::replace) to drop them.
    pub async fn set(&self, path: &Path, value: &Value) -> Result<(), Error> {
        let records = flatten(path, value)?;
        log::debug!("Setting {} ({} records)", path, records.len());

        try_join_all(
            records
                .iter()
                .map(|record| self.connector.set(&record.path, record.scalar.clone())),
        )
        .await?;
        Ok(())
    }

    /// Delete everything stored under `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored under `path`.
    pub async fn rem(&self, path: &Path) -> Result<(), Error> {
        let paths: Vec<Path> = self.connector.iter_paths(path).await?.collect();
        if paths.is_empty() {
            return Err(Error::not_found(path));
        }
        log::debug!("Removing {} ({} records)", path, paths.len());

        try_join_all(paths.iter().map(|stored| self.connector.rem(stored))).await?;
        Ok(())
    }

    /// Delete whatever is under `path`, then write `value` there.
    pub async fn replace(&self, path: &Path, value: &Value) -> Result<(), Error> {
        match self.rem(path).await {
            Ok(()) => {}
            Err(error) if error.is_not_found() => {}
            Err(error) => return Err(error),
        }
        self.set(path, value).await
    }

    /// Read the value under `path` into a Rust type.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &Path) -> Result<T, Error> {
        from_value(self.get(path).await?)
    }

    /// Serialize `data` and write it at `path`.
    pub async fn set_as<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> Result<(), Error> {
        self.set(path, &to_value(data)?).await
    }

    /// Validate a model and write it at `path`, without its identity field.
    ///
    /// # Errors
    ///
    /// `Validation` if the serialized model does not have the model's
    /// declared shape or a field fails its checks.
    pub async fn set_model<M: Model>(&self, path: &Path, model: &M) -> Result<(), Error> {
        let value = model::to_record_value(model)?;
        self.set(path, &value).await
    }

    /// Read the model stored at `path`. Its identity is the last segment of
    /// `path`.
    pub async fn get_model<M: Model>(&self, path: &Path) -> Result<M, Error> {
        let identity = model::identity_of(path)?;
        let value = self.get(path).await?;
        model::from_record_value(identity, value)
    }
}
