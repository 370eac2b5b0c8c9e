//! The Record type - one (path, scalar) row of the flat table.

use std::fmt;

use crate::{Path, Scalar};

/// A single stored row.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub path: Path,
    pub scalar: Scalar,
}

impl Record {
    pub fn new(path: Path, scalar: impl Into<Scalar>) -> Self {
        Record {
            path,
            scalar: scalar.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.scalar)
    }
}

/// Sort records by path and drop earlier duplicates, keeping the last one
/// written for each path.
pub fn normalize(records: &mut Vec<Record>) {
    // Stable sort keeps insertion order among equal paths.
    records.sort_by(|a, b| a.path.cmp(&b.path));
    let mut out: Vec<Record> = Vec::with_capacity(records.len());
    for record in records.drain(..) {
        match out.last_mut() {
            Some(last) if last.path == record.path => *last = record,
            _ => out.push(record),
        }
    }
    *records = out;
}
