//! Migration System
//!
//! File discovery and ordering, the applied-records registry, unit loading
//! and the manager that ties them together.

pub mod definitions;
pub mod manager;
pub mod mongo;
pub mod naming;
pub mod registry;
pub mod script;
pub mod status;
pub mod unit;

pub use definitions::{AppliedRecord, MigrationFile};
pub use manager::MigrationManager;
pub use mongo::{connect, MongoRegistry};
pub use naming::MigrationNaming;
pub use registry::{MemoryRegistry, Registry};
pub use script::{CommandRunner, ScriptUnit, ScriptUnitLoader};
pub use status::{ConsoleReporter, StatusReporter};
pub use unit::{MigrationUnit, StaticUnitLoader, UnitLoader};
