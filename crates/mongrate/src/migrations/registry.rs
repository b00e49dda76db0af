//! Migration Registry - persistence of applied records

use async_trait::async_trait;
use std::sync::Mutex;

use super::definitions::AppliedRecord;
use crate::error::MigrationResult;

/// Store of migrations that have been marked as applied
#[async_trait]
pub trait Registry: Send + Sync {
    /// Find the record for an exact filename
    async fn find_applied(&self, name: &str) -> MigrationResult<Option<AppliedRecord>>;

    /// Persist a record for the filename
    async fn insert_applied(&self, name: &str) -> MigrationResult<()>;
}

/// In-process registry, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<Vec<AppliedRecord>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the given filenames
    pub fn with_applied<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: Mutex::new(names.into_iter().map(AppliedRecord::new).collect()),
        }
    }

    /// Snapshot of every record, in insertion order
    pub fn records(&self) -> Vec<AppliedRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn find_applied(&self, name: &str) -> MigrationResult<Option<AppliedRecord>> {
        let records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(records.iter().find(|record| record.name == name).cloned())
    }

    async fn insert_applied(&self, name: &str) -> MigrationResult<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(AppliedRecord::new(name));
        Ok(())
    }
}
