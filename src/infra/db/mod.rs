//! Database bootstrap: provisioning, connection pool and migrations.

use std::path::Path;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    Statement,
};

use crate::config::{Config, DbSettings, MigrationSettings};

pub mod error;
pub mod migrations;
pub mod provision;

pub use error::{BootstrapError, StatementFailure};
pub use migrations::{MigrationRunner, MigrationStatus, RunReport};
pub use provision::{ensure_database, AdminConnection};

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the application pool. The database must already exist.
    pub async fn connect(settings: &DbSettings) -> Result<Self, BootstrapError> {
        let mut opt = ConnectOptions::new(settings.app_url());
        opt.max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .sqlx_logging(false);

        let connection = SeaDatabase::connect(opt).await.map_err(|e| {
            BootstrapError::connectivity(format!("connect to database '{}'", settings.name), e)
        })?;

        tracing::debug!(database = %settings.name, "Application pool opened");
        Ok(Self { connection })
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Apply pending migrations under the lock matching `db`.
    pub async fn run_migrations(
        &self,
        db: &DbSettings,
        settings: &MigrationSettings,
    ) -> Result<RunReport, BootstrapError> {
        let mut lock = migrations::lock_for(db).await?;
        MigrationRunner::new(&self.connection, settings)
            .run(lock.as_mut())
            .await
    }

    /// List migrations of `dir` with their ledger state.
    pub async fn migration_status(&self, dir: &Path) -> Result<Vec<MigrationStatus>, BootstrapError> {
        migrations::migration_status(&self.connection, dir).await
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }

    /// Close the pool.
    pub async fn close(self) -> Result<(), DbErr> {
        self.connection.close().await
    }
}

/// Startup sequence: make sure the database exists, open the pool and bring
/// the schema up to date. The returned pool is ready to serve requests.
pub async fn bootstrap(config: &Config) -> Result<Database, BootstrapError> {
    if ensure_database(&config.db).await? {
        tracing::info!(database = %config.db.name, "Provisioned new database");
    }

    let database = Database::connect(&config.db).await?;
    let report = database
        .run_migrations(&config.db, &config.migrations)
        .await?;

    if report.is_noop() {
        tracing::info!("Schema is up to date");
    } else {
        tracing::info!(applied = ?report.applied, "Schema migrated");
    }

    Ok(database)
}
