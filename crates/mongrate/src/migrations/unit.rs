//! Migration units and the loaders that resolve them from identifiers

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{MigrationError, MigrationResult};

/// Executable side of a migration
#[async_trait]
pub trait MigrationUnit: Send + Sync {
    /// Apply the migration
    async fn up(&self) -> MigrationResult<()>;

    /// Revert the migration
    async fn down(&self) -> MigrationResult<()>;
}

/// Resolves a migration identifier (filename without extension) to a unit
///
/// Units are resolved per operation and dropped afterwards.
#[async_trait]
pub trait UnitLoader: Send + Sync {
    async fn resolve(&self, identifier: &str) -> MigrationResult<Box<dyn MigrationUnit>>;
}

type UnitFactory = Box<dyn Fn() -> Box<dyn MigrationUnit> + Send + Sync>;

/// Loader backed by a table of units compiled into the binary
#[derive(Default)]
pub struct StaticUnitLoader {
    factories: HashMap<String, UnitFactory>,
}

impl StaticUnitLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under an identifier, replacing any previous one
    pub fn register<F, U>(mut self, identifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> U + Send + Sync + 'static,
        U: MigrationUnit + 'static,
    {
        self.factories
            .insert(identifier.into(), Box::new(move || Box::new(factory()) as Box<dyn MigrationUnit>));
        self
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl UnitLoader for StaticUnitLoader {
    async fn resolve(&self, identifier: &str) -> MigrationResult<Box<dyn MigrationUnit>> {
        match self.factories.get(identifier) {
            Some(factory) => Ok(factory()),
            None => {
                debug!(identifier, known = ?self.identifiers(), "No unit registered");
                Err(MigrationError::UnitNotFound {
                    identifier: identifier.to_string(),
                })
            }
        }
    }
}
