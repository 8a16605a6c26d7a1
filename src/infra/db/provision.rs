//! Target database provisioning.
//!
//! Runs before the application pool exists: connects to the server's
//! maintenance database, checks whether the target database is there and
//! creates it when it is not. For SQLite the "server" is the filesystem.

use std::path::Path;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseBackend,
    DatabaseConnection, DbErr, Statement,
};

use super::error::BootstrapError;
use crate::config::{DbEngine, DbSettings, SQLITE_MEMORY};

/// Administrative handle used only to check for and create the target database
pub enum AdminConnection {
    /// Connection to the Postgres maintenance database
    Postgres(DatabaseConnection),
    /// Filesystem-backed SQLite "server"
    Sqlite,
}

impl AdminConnection {
    /// Open the administrative connection for the configured engine.
    pub async fn open(settings: &DbSettings) -> Result<Self, BootstrapError> {
        match (settings.engine, settings.admin_url()) {
            (DbEngine::Postgres, Some(url)) => {
                let mut opt = ConnectOptions::new(url);
                opt.min_connections(1)
                    .max_connections(1)
                    .acquire_timeout(Duration::from_secs(5));

                let connection = SeaDatabase::connect(opt).await.map_err(|e| {
                    BootstrapError::connectivity(
                        format!("connect to admin database '{}'", settings.admin_name),
                        e,
                    )
                })?;
                Ok(AdminConnection::Postgres(connection))
            }
            _ => Ok(AdminConnection::Sqlite),
        }
    }

    /// Whether a database named `name` currently exists. Never mutates.
    pub async fn database_exists(&self, name: &str) -> Result<bool, BootstrapError> {
        match self {
            AdminConnection::Postgres(conn) => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    "SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1) AS present",
                    [name.into()],
                );

                let row = conn
                    .query_one(stmt)
                    .await
                    .map_err(|e| BootstrapError::connectivity("query pg_database", e))?
                    .ok_or_else(|| {
                        BootstrapError::connectivity(
                            "query pg_database",
                            DbErr::RecordNotFound("existence check returned no row".to_string()),
                        )
                    })?;

                row.try_get::<bool>("", "present")
                    .map_err(|e| BootstrapError::connectivity("read pg_database result", e))
            }
            AdminConnection::Sqlite if name == SQLITE_MEMORY => Ok(true),
            AdminConnection::Sqlite => tokio::fs::try_exists(name).await.map_err(|e| {
                BootstrapError::connectivity(
                    format!("inspect database file '{}'", name),
                    DbErr::Custom(e.to_string()),
                )
            }),
        }
    }

    /// Create the database `name`.
    ///
    /// Callers skip this when [`database_exists`](Self::database_exists)
    /// already reported presence; creating an existing database fails.
    pub async fn create_database(&self, name: &str) -> Result<(), BootstrapError> {
        validate_database_name(name)?;

        match self {
            AdminConnection::Postgres(conn) => {
                conn.execute_unprepared(&format!("CREATE DATABASE {}", quote_ident(name)))
                    .await
                    .map_err(|source| BootstrapError::Provisioning {
                        database: name.to_string(),
                        source,
                    })?;
            }
            AdminConnection::Sqlite => create_sqlite_file(Path::new(name)).await.map_err(|e| {
                BootstrapError::Provisioning {
                    database: name.to_string(),
                    source: DbErr::Custom(e.to_string()),
                }
            })?,
        }

        tracing::info!(database = %name, "Database created");
        Ok(())
    }

    /// Release the administrative connection.
    pub async fn close(self) {
        if let AdminConnection::Postgres(conn) = self {
            if let Err(e) = conn.close().await {
                tracing::warn!(error = %e, "Failed to close admin connection");
            }
        }
    }
}

/// Make sure the configured database exists, creating it when absent.
///
/// Returns `true` when the database was created by this call. The
/// administrative connection is closed on every path.
pub async fn ensure_database(settings: &DbSettings) -> Result<bool, BootstrapError> {
    let admin = AdminConnection::open(settings).await?;

    let outcome: Result<bool, BootstrapError> = async {
        if admin.database_exists(&settings.name).await? {
            tracing::debug!(database = %settings.name, "Database already exists");
            return Ok(false);
        }
        admin.create_database(&settings.name).await?;
        Ok(true)
    }
    .await;

    admin.close().await;
    outcome
}

/// Quote a Postgres identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn validate_database_name(name: &str) -> Result<(), BootstrapError> {
    let problem = if name.trim().is_empty() {
        Some("database name is empty")
    } else if name.contains('\0') {
        Some("database name contains a NUL byte")
    } else {
        None
    };

    match problem {
        Some(reason) => Err(BootstrapError::Provisioning {
            database: name.to_string(),
            source: DbErr::Custom(reason.to_string()),
        }),
        None => Ok(()),
    }
}

/// An empty file is a valid, empty SQLite database.
async fn create_sqlite_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("courses"), "\"courses\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_rejects_unusable_names() {
        assert!(matches!(
            validate_database_name("   "),
            Err(BootstrapError::Provisioning { .. })
        ));
        assert!(validate_database_name("bad\0name").is_err());
        assert!(validate_database_name("courses").is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_existence_check_then_provision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");
        let name = path.to_str().unwrap();
        let admin = AdminConnection::Sqlite;

        assert!(!admin.database_exists(name).await.unwrap());
        admin.create_database(name).await.unwrap();
        assert!(admin.database_exists(name).await.unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_create_existing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        std::fs::write(&path, b"").unwrap();

        let err = AdminConnection::Sqlite
            .create_database(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Provisioning { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_database_always_exists() {
        assert!(AdminConnection::Sqlite.database_exists(":memory:").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_database_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let settings = DbSettings::sqlite(path.to_str().unwrap());

        assert!(ensure_database(&settings).await.unwrap());
        assert!(!ensure_database(&settings).await.unwrap());
        assert!(path.exists());
    }
}
