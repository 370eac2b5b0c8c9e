//! JSON-backed connectors for flatstore.
//!
//! - [`FlatFileStore`]: the record table as one JSON object in one file
//! - [`InMemoryStore`]: the same contract without persistence
//! - [`StoreConfig`]: file location and formatting

pub mod config;
pub mod in_memory;
pub mod json_utils;
pub mod local_disk;

pub use flatstore_core_store::{Connector, Error, Path, Record, Scalar};

pub use config::StoreConfig;
pub use in_memory::InMemoryStore;
pub use local_disk::FlatFileStore;
