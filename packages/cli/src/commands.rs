//! Command execution against an open document.
//!
//! Commands:
//! - `get [path]` - Print the value at path as JSON (root by default)
//! - `set <path> <json>` - Merge a JSON value into path
//! - `rem <path>` - Remove everything under path
//! - `paths [prefix]` - List stored record paths under prefix

use std::io::Write;

use clap::Subcommand;

use flatstore_core_store::{Connector, Error, Path};
use flatstore_serde_store::{json_to_value, value_to_json, Document};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the value stored at a path
    Get {
        #[arg(default_value = "")]
        path: String,
    },
    /// Write a JSON value at a path, merging with what is there
    Set {
        path: String,
        json: String,
        /// Remove whatever is under the path first
        #[arg(long)]
        replace: bool,
    },
    /// Remove everything stored under a path
    Rem { path: String },
    /// List the stored record paths under a prefix
    Paths {
        #[arg(default_value = "")]
        prefix: String,
    },
}

/// Run `command` against `doc`, writing any output to `out`.
pub async fn execute<C: Connector>(
    command: &Command,
    doc: &Document<C>,
    out: &mut dyn Write,
) -> Result<(), Error> {
    match command {
        Command::Get { path } => {
            let value = doc.get(&Path::parse(path)?).await?;
            let text = serde_json::to_string_pretty(&value_to_json(value)?)
                .map_err(|e| Error::encode(e.to_string()))?;
            writeln!(out, "{}", text)?;
        }
        Command::Set {
            path,
            json,
            replace,
        } => {
            let path = Path::parse(path)?;
            let parsed: serde_json::Value = serde_json::from_str(json)
                .map_err(|e| Error::validation(format!("invalid JSON: {}", e)))?;
            let value = json_to_value(parsed)?;
            if *replace {
                doc.replace(&path, &value).await?;
            } else {
                doc.set(&path, &value).await?;
            }
        }
        Command::Rem { path } => {
            doc.rem(&Path::parse(path)?).await?;
        }
        Command::Paths { prefix } => {
            let prefix = Path::parse(prefix)?;
            for path in doc.connector().iter_paths(&prefix).await? {
                writeln!(out, "{}", path)?;
            }
        }
    }
    Ok(())
}
