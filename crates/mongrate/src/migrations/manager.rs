//! Migration Manager - selection and execution of pending migrations
//!
//! A migration is *unregistered* when its file exists in the migrations
//! directory but the registry holds no record with the same filename. Every
//! state-changing operation selects its targets from that set:
//!
//! - `execute` runs `up` on the selected units, oldest sequence first, and
//!   does not write to the registry;
//! - `ignore` writes a record for the selected files without loading units;
//! - `rollback` runs `down` on a single unregistered target.
//!
//! Nothing is transactional. A failure stops the operation and whatever ran
//! before it stays applied.

use std::fs;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::definitions::identifier_of;
use super::naming::MigrationNaming;
use super::registry::Registry;
use super::status::{ConsoleReporter, StatusReporter};
use super::unit::UnitLoader;
use crate::config::MigrationConfig;
use crate::error::{MigrationError, MigrationResult};

pub const ALL_REGISTERED_MESSAGE: &str = "All migrations registered, nothing to execute";
pub const UNREGISTERED_HEADER: &str =
    "Unregistered migrations (mongrate execute to execute them):";

/// Engine tracking and applying file-based migrations
pub struct MigrationManager {
    config: MigrationConfig,
    naming: MigrationNaming,
    registry: Arc<dyn Registry>,
    loader: Arc<dyn UnitLoader>,
    reporter: Arc<dyn StatusReporter>,
}

impl MigrationManager {
    /// Create a manager reporting status to the console
    pub fn new(
        config: MigrationConfig,
        registry: Arc<dyn Registry>,
        loader: Arc<dyn UnitLoader>,
    ) -> MigrationResult<Self> {
        config.validate()?;
        let naming = MigrationNaming::new(config.extensions.as_slice())?;

        Ok(Self {
            config,
            naming,
            registry,
            loader,
            reporter: Arc::new(ConsoleReporter),
        })
    }

    /// Replace the status output sink
    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Order filenames by sequence, rejecting malformed names
    pub fn sorted<I, S>(&self, filenames: I) -> MigrationResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.naming.sorted(filenames)
    }

    /// Migration files without a registry record, in sequence order
    pub async fn unregistered(&self) -> MigrationResult<Vec<String>> {
        let candidates = self.scan_directory()?;
        let total = candidates.len();

        let mut pending = Vec::new();
        for name in candidates {
            if self.registry.find_applied(&name).await?.is_none() {
                pending.push(name);
            }
        }

        debug!(total, pending = pending.len(), "Scanned migrations directory");
        self.sorted(pending)
    }

    /// Report unregistered migrations through the status sink
    pub async fn show_status(&self) -> MigrationResult<()> {
        let pending = self.unregistered().await?;

        if pending.is_empty() {
            self.reporter.success(ALL_REGISTERED_MESSAGE);
            return Ok(());
        }

        self.reporter.notice(UNREGISTERED_HEADER);
        for name in &pending {
            self.reporter.alert(name);
        }
        Ok(())
    }

    /// Run `up` for every unregistered migration, or only for `target`
    ///
    /// Returns the filenames whose units were executed.
    pub async fn execute(&self, target: Option<&str>) -> MigrationResult<Vec<String>> {
        let selected = Self::select(self.unregistered().await?, target)?;

        for name in &selected {
            let identifier = identifier_of(name);
            let unit = self.loader.resolve(identifier).await?;
            if let Err(e) = unit.up().await {
                warn!(migration = %name, error = %e, "Migration failed");
                return Err(e);
            }
            info!(migration = %name, "Executed migration");
        }

        Ok(selected)
    }

    /// Mark every unregistered migration, or only `target`, as applied
    /// without running it
    ///
    /// Returns the filenames that were registered.
    pub async fn ignore(&self, target: Option<&str>) -> MigrationResult<Vec<String>> {
        let selected = Self::select(self.unregistered().await?, target)?;

        for name in &selected {
            self.registry.insert_applied(name).await?;
            info!(migration = %name, "Ignored migration");
        }

        Ok(selected)
    }

    /// Run `down` for a single unregistered migration
    pub async fn rollback(&self, target: &str) -> MigrationResult<()> {
        let selected = Self::select(self.unregistered().await?, Some(target))?;

        for name in &selected {
            let unit = self.loader.resolve(identifier_of(name)).await?;
            if let Err(e) = unit.down().await {
                warn!(migration = %name, error = %e, "Rollback failed");
                return Err(e);
            }
            info!(migration = %name, "Rolled back migration");
        }

        Ok(())
    }

    fn select(pending: Vec<String>, target: Option<&str>) -> MigrationResult<Vec<String>> {
        match target {
            None => Ok(pending),
            Some(name) if pending.iter().any(|p| p == name) => Ok(vec![name.to_string()]),
            Some(name) => Err(MigrationError::not_found(name)),
        }
    }

    fn scan_directory(&self) -> MigrationResult<Vec<String>> {
        let dir = &self.config.migrations_dir;
        if !dir.is_dir() {
            return Err(MigrationError::MigrationsDirectoryNotFound { path: dir.clone() });
        }

        let mut names = Vec::new();
        let mut undecodable = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) if name.starts_with('.') => {}
                Ok(name) => names.push(name),
                Err(raw) => {
                    let lossy = raw.to_string_lossy().into_owned();
                    if !lossy.starts_with('.') {
                        undecodable.push(lossy);
                    }
                }
            }
        }

        if !undecodable.is_empty() {
            return Err(MigrationError::malformed(undecodable));
        }

        let colliding = self.naming.colliding(&names);
        if !colliding.is_empty() {
            warn!(names = ?colliding, "Migration files share an identifier");
            return Err(MigrationError::malformed(colliding));
        }

        Ok(names)
    }
}
