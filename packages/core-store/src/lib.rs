//! Core flatstore: the flat path codec and its types.
//!
//! A document store that keeps nested values as a flat, sorted table of
//! (path, scalar) records:
//! - `Path`: dot-delimited segments, keys or bracketed array indices
//! - `Value`: the tree a caller reads and writes
//! - `Scalar` / `Record`: the leaf and the stored row
//! - `flatten` / `reconstruct`: the bijection between the two
//! - `Connector`: the storage contract the backends implement
//!
//! This crate does no I/O.
//!
//! # Example
//!
//! ```rust
//! use flatstore_core_store::{flatten, reconstruct, path, Value};
//!
//! let value = Value::from(vec![2i64, 3]);
//! let records = flatten(&path!("a.y"), &value).unwrap();
//! assert_eq!(records.len(), 3);
//! assert_eq!(reconstruct(&path!("a.y"), &records).unwrap(), Some(value));
//! ```

mod codec;
mod error;
mod path;
mod record;
mod traits;
mod value;

pub use codec::{flatten, reconstruct};
pub use error::Error;
pub use path::{Path, PathError, Segment, MAX_ARRAY_LEN};
pub use record::{normalize, Record};
pub use traits::{Connector, Paths};
pub use value::{Scalar, Value};
