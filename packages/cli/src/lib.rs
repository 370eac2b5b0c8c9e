//! # flatstore-cli
//!
//! Command-line access to a flatstore file.
//!
//! ## Usage
//!
//! ```bash
//! flatstore set a.b '{"x": 1, "y": [2, 3]}'
//! flatstore get a.b
//! flatstore paths a
//! flatstore --file other.json --indent 2 rem a.b.y
//! ```
//!
//! The store file defaults to `FLATSTORE_PATH`, then `file_db.json`.
//! `RUST_LOG=debug` shows every table read and write.

pub mod commands;

use std::io::Write;
use std::path::PathBuf;

use flatstore_core_store::Error;
use flatstore_json_store::{FlatFileStore, StoreConfig};
use flatstore_serde_store::Document;

pub use commands::{execute, Command};

/// Resolve the store configuration: flags win over the environment.
pub fn resolve_config(file: Option<PathBuf>, indent: Option<usize>) -> StoreConfig {
    let mut config = StoreConfig::from_env();
    if let Some(file) = file {
        config.path = file;
    }
    if let Some(indent) = indent {
        config.indent = indent;
    }
    config
}

/// Open the store, run one command, close the store.
pub async fn run(config: StoreConfig, command: &Command, out: &mut dyn Write) -> Result<(), Error> {
    log::debug!("Using store {}", config.path.display());
    let doc = Document::open(FlatFileStore::new(config)).await?;
    let result = execute(command, &doc, out).await;
    doc.close().await?;
    result
}
