//! Error types for the migration system
//!
//! Every failure an operation can raise is a variant of [`MigrationError`].
//! None of them are recovered internally; the caller decides what to print.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// One or more filenames do not follow `<sequence>_<label>.<ext>`
    #[error("Founded malformed migration names: {}", names.join(", "))]
    MalformedMigrationName { names: Vec<String> },

    /// The migrations directory is missing
    #[error("Migrations dir '{}' not found", path.display())]
    MigrationsDirectoryNotFound { path: PathBuf },

    /// The targeted migration is not among the unregistered ones
    #[error("Migration '{name}' not found among unregistered migrations")]
    MigrationNotFound { name: String },

    /// No unit could be resolved for the identifier
    #[error("Migration unit '{identifier}' could not be resolved")]
    UnitNotFound { identifier: String },

    /// A migration script exists but cannot be parsed
    #[error("Invalid migration script {}: {message}", path.display())]
    InvalidScript { path: PathBuf, message: String },

    /// A unit's up or down step failed
    #[error("Migration unit '{identifier}' failed: {message}")]
    UnitFailed { identifier: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown task '{name}', available tasks: {}", available.join(", "))]
    UnknownTask { name: String, available: Vec<String> },

    #[error("Task '{task}' requires a migration name")]
    MissingTaskArgument { task: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl MigrationError {
    /// Create a malformed migration name error
    pub fn malformed(names: Vec<String>) -> Self {
        Self::MalformedMigrationName { names }
    }

    /// Create a migration not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::MigrationNotFound { name: name.into() }
    }

    /// Create a unit failure error
    pub fn unit_failed(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnitFailed {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Stable, machine-readable kind of the error
    pub fn kind(&self) -> &'static str {
        match self {
            MigrationError::MalformedMigrationName { .. } => "malformed_migration_name",
            MigrationError::MigrationsDirectoryNotFound { .. } => "migrations_directory_not_found",
            MigrationError::MigrationNotFound { .. } => "migration_not_found",
            MigrationError::UnitNotFound { .. } => "unit_not_found",
            MigrationError::InvalidScript { .. } => "invalid_script",
            MigrationError::UnitFailed { .. } => "unit_failed",
            MigrationError::Database(_) => "database",
            MigrationError::Io(_) => "io",
            MigrationError::UnknownTask { .. } => "unknown_task",
            MigrationError::MissingTaskArgument { .. } => "missing_task_argument",
            MigrationError::Config(_) => "config",
        }
    }
}

// Convert from driver errors
impl From<mongodb::error::Error> for MigrationError {
    fn from(err: mongodb::error::Error) -> Self {
        MigrationError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_lists_every_name() {
        let err = MigrationError::malformed(vec!["test_1.py".into(), "abc.json".into()]);
        let message = err.to_string();
        assert!(message.starts_with("Founded"));
        assert!(message.contains("test_1.py"));
        assert!(message.contains("abc.json"));
    }

    #[test]
    fn test_directory_message_prefix() {
        let err = MigrationError::MigrationsDirectoryNotFound {
            path: PathBuf::from("mongomigrations"),
        };
        assert!(err.to_string().starts_with("Migrations dir"));
        assert_eq!(err.kind(), "migrations_directory_not_found");
    }
}
