//! # mongrate
//!
//! Ordered, file-based migrations for MongoDB.
//!
//! Migration files named `<sequence>_<label>.<ext>` live in a migrations
//! directory. A file is pending until a `{name: <filename>}` record exists in
//! the registry collection. [`MigrationManager`] lists pending files in
//! numeric sequence order and executes, ignores or rolls them back;
//! [`tasks::migration_tasks`] exposes those operations as named tasks.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mongrate::{MemoryRegistry, MigrationConfig, MigrationManager, StaticUnitLoader};
//!
//! # async fn run() -> mongrate::MigrationResult<()> {
//! let manager = MigrationManager::new(
//!     MigrationConfig::default(),
//!     Arc::new(MemoryRegistry::new()),
//!     Arc::new(StaticUnitLoader::new()),
//! )?;
//! manager.show_status().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod migrations;
pub mod tasks;

pub use config::{ConfigError, MigrationConfig, MongoConfig};
pub use error::{MigrationError, MigrationResult};
pub use migrations::*;
pub use tasks::{migration_tasks, TaskTable};
