use std::path::PathBuf;
use std::sync::Arc;

use mongrate::{
    connect, migration_tasks, MigrationConfig, MigrationManager, MigrationResult, MongoConfig,
    MongoRegistry, ScriptUnitLoader,
};

/// Settings collected from the command line; `None` keeps the environment value
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub task: Option<String>,
    pub migration: Option<String>,
    pub dir: Option<PathBuf>,
    pub collection: Option<String>,
    pub extensions: Vec<String>,
    pub mongo_url: Option<String>,
    pub database: Option<String>,
}

impl MigrateOptions {
    /// Environment configuration with command line overrides applied
    pub fn configs(&self) -> MigrationResult<(MigrationConfig, MongoConfig)> {
        let mut config = MigrationConfig::from_env()?;
        if let Some(dir) = &self.dir {
            config.migrations_dir = dir.clone();
        }
        if let Some(collection) = &self.collection {
            config.collection = collection.clone();
        }
        if !self.extensions.is_empty() {
            config.extensions = self
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();
        }
        config.validate()?;

        let mut mongo = MongoConfig::from_env();
        if let Some(url) = &self.mongo_url {
            mongo.url = url.clone();
        }
        if let Some(database) = &self.database {
            mongo.database = Some(database.clone());
        }
        mongo.validate()?;

        Ok((config, mongo))
    }
}

pub async fn run(options: MigrateOptions) -> MigrationResult<()> {
    let (config, mongo) = options.configs()?;

    let database = connect(&mongo).await?;
    let registry = Arc::new(MongoRegistry::new(&database, &config.collection));
    let loader = Arc::new(
        ScriptUnitLoader::new(&config.migrations_dir, Arc::new(database))
            .with_extensions(config.extensions.clone()),
    );

    let manager = MigrationManager::new(config, registry, loader)?;
    let tasks = migration_tasks(Arc::new(manager));

    tasks
        .dispatch(options.task.as_deref(), options.migration)
        .await
}
