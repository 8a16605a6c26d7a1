//! Migrate command - Database migration management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::db::ensure_database;
use crate::infra::{bootstrap, Database};

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, mut config: Config) -> AppResult<()> {
    match args.action {
        MigrateAction::Up(arg) => {
            if let Some(dir) = arg.dir {
                config.migrations.dir = dir;
            }
            let db = bootstrap(&config).await?;
            close(db).await;
        }
        MigrateAction::Status(arg) => {
            let dir = arg.dir.unwrap_or_else(|| config.migrations.dir.clone());

            ensure_database(&config.db).await?;
            let db = Database::connect(&config.db).await?;
            let statuses = db.migration_status(&dir).await;
            close(db).await;

            for status in statuses? {
                let state = match (status.applied_at, status.on_disk) {
                    (Some(at), true) => format!("applied {}", at.to_rfc3339()),
                    (Some(at), false) => format!("applied {} (file missing)", at.to_rfc3339()),
                    (None, _) => "pending".to_string(),
                };
                println!("{}: {}", status.filename, state);
            }
        }
    }

    Ok(())
}

async fn close(db: Database) {
    if let Err(e) = db.close().await {
        tracing::warn!(error = %e, "Failed to close database pool");
    }
}
