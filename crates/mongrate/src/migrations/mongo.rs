//! MongoDB backed collaborators: the applied-records registry and the
//! command runner used by script migrations.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database};
use tracing::debug;

use super::definitions::AppliedRecord;
use super::registry::Registry;
use super::script::CommandRunner;
use crate::config::MongoConfig;
use crate::error::MigrationResult;

/// Connect to the configured database
pub async fn connect(config: &MongoConfig) -> MigrationResult<Database> {
    let database = config.validate()?;
    let client = Client::with_uri_str(&config.url).await?;
    debug!(database, "Connected to MongoDB");
    Ok(client.database(database))
}

/// Registry storing `{name}` documents in a collection
#[derive(Debug, Clone)]
pub struct MongoRegistry {
    collection: Collection<AppliedRecord>,
}

impl MongoRegistry {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

#[async_trait]
impl Registry for MongoRegistry {
    async fn find_applied(&self, name: &str) -> MigrationResult<Option<AppliedRecord>> {
        Ok(self.collection.find_one(doc! { "name": name }, None).await?)
    }

    async fn insert_applied(&self, name: &str) -> MigrationResult<()> {
        self.collection
            .insert_one(AppliedRecord::new(name), None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for Database {
    async fn run_command(&self, command: Document) -> MigrationResult<Document> {
        Ok(Database::run_command(self, command, None).await?)
    }
}
