//! Document access for flatstore.
//!
//! This layer turns a [`Connector`]'s flat record table back into whole
//! values. It adds:
//! - [`Document`]: get/set/rem of nested values at a path
//! - [`Model`]: typed records with a declared shape and validation
//! - `Profile`, `TodoList`, `Task`: the records the to-do application keeps
//! - Value <-> serde conversions
//!
//! # Example
//!
//! ```rust,ignore
//! use flatstore_serde_store::{Document, Model, TodoList};
//! use flatstore_json_store::FlatFileStore;
//!
//! let doc = Document::open(FlatFileStore::at("file_db.json")).await?;
//! let list = TodoList::new("123", now_ms, "42", None, 8.0);
//! doc.set_model(&list.storage_path()?, &list).await?;
//! let back: TodoList = doc.get_model(&list.storage_path()?).await?;
//! ```

mod convert;
mod document;
pub mod model;
pub mod models;
mod ser;
pub mod validators;

pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use document::Document;
pub use model::{Field, FieldKind, Model};
pub use models::{Due, Profile, Task, TodoList};
pub use ser::{EncodeError, ValueSerializer};

// Re-export core types for convenience
pub use flatstore_core_store::{Connector, Error, Path, PathError, Record, Scalar, Value};
