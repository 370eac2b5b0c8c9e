//! Store configuration.

use std::path::PathBuf;

/// Default backing file, relative to the working directory.
pub const DEFAULT_PATH: &str = "file_db.json";

/// Default indentation width of the backing file.
pub const DEFAULT_INDENT: usize = 4;

/// Environment variable overriding the backing file location.
pub const PATH_ENV: &str = "FLATSTORE_PATH";

/// Environment variable overriding the indentation width.
pub const INDENT_ENV: &str = "FLATSTORE_INDENT";

/// Where the table lives and how it is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Spaces per nesting level; zero writes compact JSON.
    pub indent: usize,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            indent: DEFAULT_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Defaults overridden by `FLATSTORE_PATH` and `FLATSTORE_INDENT`.
    ///
    /// An indent that does not parse as a number is ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(PATH_ENV).filter(|p| !p.is_empty()) {
            config.path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(INDENT_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(indent) => config.indent = indent,
                Err(e) => log::warn!("Ignoring {}={:?}: {}", INDENT_ENV, raw, e),
            }
        }

        config
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}
