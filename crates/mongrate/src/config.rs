//! Configuration for the migration system
//!
//! Values come from defaults, then `MONGRATE_*` environment variables. The
//! CLI applies its own flags on top before calling `validate`.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MIGRATIONS_DIR: &str = "mongomigrations";
pub const DEFAULT_COLLECTION: &str = "migrations";
pub const DEFAULT_EXTENSION: &str = "json";
pub const DEFAULT_MONGO_URL: &str = "mongodb://localhost:27017";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Configuration for discovering and registering migrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Directory scanned for migration files
    pub migrations_dir: PathBuf,
    /// Collection holding applied records
    pub collection: String,
    /// Recognised file extensions, without the leading dot
    pub extensions: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            collection: DEFAULT_COLLECTION.to_string(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
        }
    }
}

impl MigrationConfig {
    /// Use a different migrations directory
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Replace the recognised extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = env_var("MONGRATE_DIR") {
            config.migrations_dir = PathBuf::from(dir);
        }

        if let Some(collection) = env_var("MONGRATE_COLLECTION") {
            config.collection = collection;
        }

        if let Some(extensions) = env_var("MONGRATE_EXTENSIONS") {
            config.extensions = parse_extensions(&extensions);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "collection",
                &self.collection,
                "a non-empty collection name",
            ));
        }

        if self.extensions.is_empty() {
            return Err(ConfigError::missing_required(
                "extensions",
                "At least one migration file extension must be recognised",
            ));
        }

        for ext in &self.extensions {
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::invalid_value(
                    "extensions",
                    ext,
                    "alphanumeric extension without leading dot (e.g. json)",
                ));
            }
        }

        Ok(())
    }
}

/// Connection settings for the document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub url: String,
    pub database: Option<String>,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MONGO_URL.to_string(),
            database: None,
        }
    }
}

impl MongoConfig {
    /// Load configuration from environment variables
    ///
    /// The database name is not validated here so that the CLI can still
    /// supply it through a flag.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = env_var("MONGRATE_MONGO_URL") {
            config.url = url;
        }
        config.database = env_var("MONGRATE_DATABASE");

        config
    }

    /// Validate the configuration and return the database name
    pub fn validate(&self) -> Result<&str, ConfigError> {
        if !self.url.starts_with("mongodb://") && !self.url.starts_with("mongodb+srv://") {
            return Err(ConfigError::invalid_value(
                "url",
                &self.url,
                "a mongodb:// or mongodb+srv:// connection string",
            ));
        }

        match self.database.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(ConfigError::missing_required(
                "database",
                "Set MONGRATE_DATABASE or pass --database",
            )),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Split a comma separated extension list, dropping leading dots
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "MONGRATE_DIR",
            "MONGRATE_COLLECTION",
            "MONGRATE_EXTENSIONS",
            "MONGRATE_MONGO_URL",
            "MONGRATE_DATABASE",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = MigrationConfig::from_env().unwrap();
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.migrations_dir, PathBuf::from("mongomigrations"));
        assert_eq!(config.collection, "migrations");
        assert_eq!(config.extensions, vec!["json".to_string()]);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("MONGRATE_DIR", "db/migrations");
        env::set_var("MONGRATE_COLLECTION", "applied");
        env::set_var("MONGRATE_EXTENSIONS", ".json, js");

        let config = MigrationConfig::from_env().unwrap();
        assert_eq!(config.migrations_dir, PathBuf::from("db/migrations"));
        assert_eq!(config.collection, "applied");
        assert_eq!(config.extensions, vec!["json".to_string(), "js".to_string()]);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_extensions_rejected() {
        clear_env();
        env::set_var("MONGRATE_EXTENSIONS", ",,");
        assert!(matches!(
            MigrationConfig::from_env(),
            Err(ConfigError::MissingRequired { .. })
        ));

        let config = MigrationConfig::default().with_extensions(["tar.gz"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_mongo_config_requires_database() {
        clear_env();
        let config = MongoConfig::from_env();
        assert_eq!(config.url, DEFAULT_MONGO_URL);
        assert!(config.validate().is_err());

        env::set_var("MONGRATE_DATABASE", "shop");
        let config = MongoConfig::from_env();
        assert_eq!(config.validate().unwrap(), "shop");

        let bad = MongoConfig {
            url: "postgres://localhost".to_string(),
            database: Some("shop".to_string()),
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidValue { .. })));
        clear_env();
    }
}
