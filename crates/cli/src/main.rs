mod commands;
mod logging;

use clap::Parser;
use commands::migrate::{self, MigrateOptions};
use console::style;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mongrate")]
#[command(about = "Ordered, file-based MongoDB migrations")]
#[command(after_help = "Tasks:\n  status              List unregistered migrations (default)\n  execute [NAME]      Run up for all unregistered migrations, or only NAME\n  ignore [NAME]       Register migrations without running them\n  rollback NAME       Run down for an unregistered migration")]
struct Cli {
    /// Task to run
    task: Option<String>,

    /// Migration filename passed to the task
    migration: Option<String>,

    /// Directory holding migration files [env: MONGRATE_DIR]
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Collection holding applied records [env: MONGRATE_COLLECTION]
    #[arg(long)]
    collection: Option<String>,

    /// Recognised migration file extensions [env: MONGRATE_EXTENSIONS]
    #[arg(long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// MongoDB connection string [env: MONGRATE_MONGO_URL]
    #[arg(long)]
    mongo_url: Option<String>,

    /// Database to migrate [env: MONGRATE_DATABASE]
    #[arg(long)]
    database: Option<String>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn logging_config(&self) -> logging::LoggingConfig {
        let config = logging::LoggingConfig::default()
            .with_level(&self.log_level)
            .with_json(self.log_json);

        match std::env::var("MONGRATE_LOG") {
            Ok(filter) if !filter.trim().is_empty() => config.with_env_filter(filter),
            _ => config,
        }
    }

    fn into_options(self) -> MigrateOptions {
        MigrateOptions {
            task: self.task,
            migration: self.migration,
            dir: self.dir,
            collection: self.collection,
            extensions: self.extensions,
            mongo_url: self.mongo_url,
            database: self.database,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    logging::init_logging(&cli.logging_config()).map_err(|e| anyhow::anyhow!(e))?;
    migrate::run(cli.into_options()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
