//! Script migrations - JSON files holding database commands
//!
//! A script lives next to the other migration files and looks like:
//!
//! ```json
//! {
//!   "up":   [{ "createIndexes": "users", "indexes": [{ "key": { "email": 1 }, "name": "email_1" }] }],
//!   "down": [{ "dropIndexes": "users", "index": "email_1" }]
//! }
//! ```
//!
//! Each command document is sent as-is to the database, in order.

use async_trait::async_trait;
use mongodb::bson::Document;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::unit::{MigrationUnit, UnitLoader};
use crate::config::DEFAULT_EXTENSION;
use crate::error::{MigrationError, MigrationResult};

/// Something able to execute a database command document
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run_command(&self, command: Document) -> MigrationResult<Document>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MigrationScript {
    #[serde(default)]
    up: Vec<Document>,
    #[serde(default)]
    down: Vec<Document>,
}

/// Loads `<dir>/<identifier>.<ext>` scripts, trying each extension in turn
pub struct ScriptUnitLoader {
    dir: PathBuf,
    extensions: Vec<String>,
    runner: Arc<dyn CommandRunner>,
}

impl ScriptUnitLoader {
    pub fn new(dir: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            dir: dir.into(),
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            runner,
        }
    }

    /// Read scripts with these extensions, in order of preference
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    async fn read_script(&self, identifier: &str) -> MigrationResult<Option<(PathBuf, String)>> {
        for ext in &self.extensions {
            let path = self.dir.join(format!("{}.{}", identifier, ext));
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok(Some((path, content))),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl UnitLoader for ScriptUnitLoader {
    async fn resolve(&self, identifier: &str) -> MigrationResult<Box<dyn MigrationUnit>> {
        let (path, content) = self
            .read_script(identifier)
            .await?
            .ok_or_else(|| MigrationError::UnitNotFound {
                identifier: identifier.to_string(),
            })?;

        let script = parse_script(&path, &content)?;
        debug!(
            identifier,
            up = script.up.len(),
            down = script.down.len(),
            "Loaded migration script"
        );

        Ok(Box::new(ScriptUnit {
            identifier: identifier.to_string(),
            up: script.up,
            down: script.down,
            runner: Arc::clone(&self.runner),
        }))
    }
}

fn parse_script(path: &Path, content: &str) -> MigrationResult<MigrationScript> {
    if content.trim().is_empty() {
        return Ok(MigrationScript::default());
    }

    serde_json::from_str(content).map_err(|e| MigrationError::InvalidScript {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// A loaded script, ready to run its commands
pub struct ScriptUnit {
    identifier: String,
    up: Vec<Document>,
    down: Vec<Document>,
    runner: Arc<dyn CommandRunner>,
}

impl ScriptUnit {
    async fn run_all(&self, commands: &[Document], direction: &str) -> MigrationResult<()> {
        for (index, command) in commands.iter().enumerate() {
            if let Err(e) = self.runner.run_command(command.clone()).await {
                warn!(
                    identifier = %self.identifier,
                    direction,
                    index,
                    error = %e,
                    "Migration command failed"
                );
                return Err(MigrationError::unit_failed(
                    &self.identifier,
                    format!("{} command #{} failed: {}", direction, index + 1, e),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MigrationUnit for ScriptUnit {
    async fn up(&self) -> MigrationResult<()> {
        self.run_all(&self.up, "up").await
    }

    async fn down(&self) -> MigrationResult<()> {
        self.run_all(&self.down, "down").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRunner {
        commands: Mutex<Vec<Document>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run_command(&self, command: Document) -> MigrationResult<Document> {
            if let Some(key) = self.fail_on {
                if command.contains_key(key) {
                    return Err(MigrationError::Database(format!("{} refused", key)));
                }
            }
            self.commands.lock().unwrap().push(command);
            Ok(doc! { "ok": 1 })
        }
    }

    fn write_script(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_runs_commands_in_order() {
        let temp_dir = TempDir::new().unwrap();
        write_script(
            &temp_dir,
            "1_users.json",
            r#"{
                "up": [{ "create": "users" }, { "createIndexes": "users", "indexes": [] }],
                "down": [{ "drop": "users" }]
            }"#,
        );

        let runner = Arc::new(RecordingRunner::default());
        let loader = ScriptUnitLoader::new(temp_dir.path(), runner.clone());

        let unit = loader.resolve("1_users").await.unwrap();
        unit.up().await.unwrap();
        {
            let commands = runner.commands.lock().unwrap();
            assert_eq!(commands.len(), 2);
            assert_eq!(commands[0], doc! { "create": "users" });
            assert!(commands[1].contains_key("createIndexes"));
        }

        unit.down().await.unwrap();
        let commands = runner.commands.lock().unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2], doc! { "drop": "users" });
    }

    #[tokio::test]
    async fn test_missing_sections_and_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        write_script(&temp_dir, "1_only_up.json", r#"{ "up": [{ "create": "logs" }] }"#);
        write_script(&temp_dir, "2_empty.json", "");

        let runner = Arc::new(RecordingRunner::default());
        let loader = ScriptUnitLoader::new(temp_dir.path(), runner.clone());

        loader.resolve("1_only_up").await.unwrap().down().await.unwrap();
        loader.resolve("2_empty").await.unwrap().up().await.unwrap();
        assert!(runner.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_script_is_unit_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ScriptUnitLoader::new(temp_dir.path(), Arc::new(RecordingRunner::default()));

        match loader.resolve("3_absent").await {
            Err(MigrationError::UnitNotFound { identifier }) => assert_eq!(identifier, "3_absent"),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected resolution failure"),
        }
    }

    #[tokio::test]
    async fn test_invalid_script_reported() {
        let temp_dir = TempDir::new().unwrap();
        write_script(&temp_dir, "4_broken.json", r#"{ "up": "not a list" }"#);
        write_script(&temp_dir, "5_typo.json", r#"{ "upp": [] }"#);
        let loader = ScriptUnitLoader::new(temp_dir.path(), Arc::new(RecordingRunner::default()));

        for id in ["4_broken", "5_typo"] {
            match loader.resolve(id).await {
                Err(MigrationError::InvalidScript { path, .. }) => {
                    assert!(path.ends_with(format!("{}.json", id)));
                }
                Err(other) => panic!("unexpected error: {other:?}"),
                Ok(_) => panic!("expected invalid script"),
            }
        }
    }

    #[tokio::test]
    async fn test_first_failing_command_aborts() {
        let temp_dir = TempDir::new().unwrap();
        write_script(
            &temp_dir,
            "6_partial.json",
            r#"{ "up": [{ "create": "a" }, { "drop": "b" }, { "create": "c" }] }"#,
        );
        let runner = Arc::new(RecordingRunner {
            fail_on: Some("drop"),
            ..Default::default()
        });
        let loader = ScriptUnitLoader::new(temp_dir.path(), runner.clone());

        let err = loader.resolve("6_partial").await.unwrap().up().await.unwrap_err();
        assert_eq!(err.kind(), "unit_failed");
        assert!(err.to_string().contains("up command #2"));
        assert_eq!(runner.commands.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_extensions() {
        let temp_dir = TempDir::new().unwrap();
        write_script(&temp_dir, "7_seed.mongo", r#"{ "up": [{ "ping": 1 }] }"#);
        write_script(&temp_dir, "8_both.json", r#"{ "up": [{ "ping": 1, "comment": "json" }] }"#);
        write_script(&temp_dir, "8_both.mongo", r#"{ "up": [{ "ping": 1, "comment": "mongo" }] }"#);
        let runner = Arc::new(RecordingRunner::default());
        let loader = ScriptUnitLoader::new(temp_dir.path(), runner.clone())
            .with_extensions(["mongo", "json"]);

        loader.resolve("7_seed").await.unwrap().up().await.unwrap();
        loader.resolve("8_both").await.unwrap().up().await.unwrap();

        let commands = runner.commands.lock().unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].get_str("comment").unwrap(), "mongo");
    }
}
