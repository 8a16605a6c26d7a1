//! Mutual exclusion around a migration run.
//!
//! Two processes starting against the same database must not both decide a
//! file is pending. A run holds one of these locks from before the ledger is
//! read until the last file is recorded:
//! - Postgres: session-scoped advisory lock on a dedicated connection,
//! - SQLite file: OS exclusive lock on `<db>.migrate.lock`,
//! - SQLite in-memory: nothing to exclude.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseBackend,
    DatabaseConnection, Statement,
};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::{DbEngine, DbSettings, MIGRATION_LOCK_NAMESPACE};
use crate::infra::db::error::BootstrapError;

/// Advisory lock id derived from a textual key.
pub fn pg_lock_id(key: &str) -> i64 {
    xxh3_64(key.as_bytes()) as i64
}

/// Lock held for the duration of a migration run
#[async_trait]
pub trait MigrationLock: Send {
    /// Try to take the lock without blocking.
    /// `Ok(false)` means another session holds it.
    async fn try_acquire(&mut self) -> Result<bool, BootstrapError>;

    /// Give the lock back. Releasing a lock that is not held is a no-op.
    async fn release(&mut self) -> Result<(), BootstrapError>;
}

/// Poll `lock` with exponential backoff until acquired or `timeout` elapses.
pub async fn acquire(lock: &mut dyn MigrationLock, timeout: Duration) -> Result<(), BootstrapError> {
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if lock.try_acquire().await? {
            debug!(
                attempts,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Migration lock acquired"
            );
            return Ok(());
        }

        if start.elapsed() >= timeout {
            return Err(BootstrapError::lock(format!(
                "not acquired after {:?} ({} attempts); another instance may be migrating",
                start.elapsed(),
                attempts
            )));
        }

        let delay_ms = (5u64 << attempts.saturating_sub(1).min(4)).min(80);
        debug!(attempts, delay_ms, "Migration lock busy, backing off");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Pick the lock matching the configured engine.
pub async fn lock_for(settings: &DbSettings) -> Result<Box<dyn MigrationLock>, BootstrapError> {
    match settings.engine {
        DbEngine::Postgres => Ok(Box::new(PgAdvisoryLock::connect(settings).await?)),
        DbEngine::Sqlite => match settings.sqlite_path() {
            Some(db_path) => Ok(Box::new(SqliteFileLock::for_database(&db_path))),
            None => Ok(Box::new(NoopLock)),
        },
    }
}

/// Postgres session-level advisory lock.
///
/// Lives on its own single-connection pool so that lock and unlock are issued
/// on the same server session, independent of the application pool.
pub struct PgAdvisoryLock {
    conn: Option<DatabaseConnection>,
    lock_key: i64,
    held: bool,
}

impl PgAdvisoryLock {
    /// Open the dedicated lock session for the application database.
    pub async fn connect(settings: &DbSettings) -> Result<Self, BootstrapError> {
        let mut opt = ConnectOptions::new(settings.app_url());
        opt.min_connections(1)
            .max_connections(1)
            .acquire_timeout(settings.acquire_timeout);

        let conn = SeaDatabase::connect(opt)
            .await
            .map_err(|e| BootstrapError::connectivity("open migration lock session", e))?;

        Ok(Self {
            conn: Some(conn),
            lock_key: pg_lock_id(&format!("{}:{}", MIGRATION_LOCK_NAMESPACE, settings.name)),
            held: false,
        })
    }

    async fn query_flag(
        conn: &DatabaseConnection,
        sql: &str,
        lock_key: i64,
    ) -> Result<bool, BootstrapError> {
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, [lock_key.into()]);
        let row = conn
            .query_one(stmt)
            .await
            .map_err(|e| BootstrapError::lock(format!("advisory lock query failed: {}", e)))?
            .ok_or_else(|| BootstrapError::lock("advisory lock query returned no row"))?;

        row.try_get::<bool>("", "flag")
            .map_err(|e| BootstrapError::lock(format!("failed to read advisory lock result: {}", e)))
    }
}

#[async_trait]
impl MigrationLock for PgAdvisoryLock {
    async fn try_acquire(&mut self) -> Result<bool, BootstrapError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| BootstrapError::lock("lock session already closed"))?;

        let locked =
            Self::query_flag(conn, "SELECT pg_try_advisory_lock($1) AS flag", self.lock_key).await?;
        self.held = locked;
        Ok(locked)
    }

    async fn release(&mut self) -> Result<(), BootstrapError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        let result = if self.held {
            match Self::query_flag(&conn, "SELECT pg_advisory_unlock($1) AS flag", self.lock_key)
                .await
            {
                Ok(true) => Ok(()),
                Ok(false) => {
                    warn!(lock_key = self.lock_key, "Advisory unlock returned false");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        } else {
            Ok(())
        };
        self.held = false;

        // Closing the session also drops any advisory lock it still holds.
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close migration lock session");
        }
        result
    }
}

/// Exclusive OS file lock next to a SQLite database file
pub struct SqliteFileLock {
    lock_path: PathBuf,
    file: Option<File>,
}

impl SqliteFileLock {
    /// Lock file for the database at `db_path` (`<db_path>.migrate.lock`).
    pub fn for_database(db_path: &Path) -> Self {
        let mut lock_path = db_path.as_os_str().to_owned();
        lock_path.push(".migrate.lock");
        Self {
            lock_path: PathBuf::from(lock_path),
            file: None,
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

#[async_trait]
impl MigrationLock for SqliteFileLock {
    async fn try_acquire(&mut self) -> Result<bool, BootstrapError> {
        if self.file.is_some() {
            return Ok(true);
        }

        if let Some(parent) = self.lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                BootstrapError::lock(format!("failed to create lock file directory: {}", e))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| BootstrapError::lock(format!("failed to open lock file: {}", e)))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(true) => {
                debug!(lock_path = %self.lock_path.display(), "SQLite file lock acquired");
                self.file = Some(file);
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(BootstrapError::lock(format!(
                "failed to lock {}: {}",
                self.lock_path.display(),
                e
            ))),
        }
    }

    async fn release(&mut self) -> Result<(), BootstrapError> {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                // The lock goes away with the handle anyway.
                debug!(error = %e, lock_path = %self.lock_path.display(), "File unlock returned error");
            }
        }
        Ok(())
    }
}

/// Lock for databases only one process can see (SQLite in-memory)
pub struct NoopLock;

#[async_trait]
impl MigrationLock for NoopLock {
    async fn try_acquire(&mut self) -> Result<bool, BootstrapError> {
        Ok(true)
    }

    async fn release(&mut self) -> Result<(), BootstrapError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_id_is_stable_per_key() {
        assert_eq!(pg_lock_id("course-api:migrate:app"), pg_lock_id("course-api:migrate:app"));
        assert_ne!(pg_lock_id("course-api:migrate:app"), pg_lock_id("course-api:migrate:other"));
    }

    #[test]
    fn test_lock_file_sits_next_to_database() {
        let lock = SqliteFileLock::for_database(Path::new("/var/data/app.db"));
        assert_eq!(lock.lock_path(), Path::new("/var/data/app.db.migrate.lock"));
    }

    #[tokio::test]
    async fn test_file_lock_excludes_second_holder() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let mut first = SqliteFileLock::for_database(&db_path);
        let mut second = SqliteFileLock::for_database(&db_path);

        assert!(first.try_acquire().await.unwrap());
        assert!(!second.try_acquire().await.unwrap());

        first.release().await.unwrap();
        assert!(second.try_acquire().await.unwrap());
        second.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_acquire_times_out_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("app.db");
        let mut holder = SqliteFileLock::for_database(&db_path);
        assert!(holder.try_acquire().await.unwrap());

        let mut waiter = SqliteFileLock::for_database(&db_path);
        let err = acquire(&mut waiter, Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Lock { .. }));

        holder.release().await.unwrap();
        acquire(&mut waiter, Duration::from_millis(50)).await.unwrap();
        waiter.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_noop_lock_always_acquires() {
        let mut lock = NoopLock;
        acquire(&mut lock, Duration::ZERO).await.unwrap();
        lock.release().await.unwrap();
    }
}
