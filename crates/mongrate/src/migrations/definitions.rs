//! Migration Definitions - Core types shared by the migration system

use serde::{Deserialize, Serialize};

/// A migration file discovered on disk, `<sequence>_<label>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Raw filename, unique within the migrations directory
    pub filename: String,
    /// Sequence digits with leading zeros removed ("0" for all zeros)
    pub sequence: String,
    /// Filename without its extension, used to resolve the unit
    pub identifier: String,
}

impl MigrationFile {
    /// Compare two sequences as non-negative integers of any length
    pub fn cmp_sequence(&self, other: &Self) -> std::cmp::Ordering {
        self.sequence
            .len()
            .cmp(&other.sequence.len())
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Registry document marking a migration as applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRecord {
    pub name: String,
}

impl AppliedRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Identifier derived from a migration filename
pub fn identifier_of(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    }
}
