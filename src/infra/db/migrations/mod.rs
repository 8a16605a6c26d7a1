//! Plain-SQL migration runner.
//!
//! Migrations are `*.sql` files in a flat directory, applied in filename
//! order, each exactly once. The `schema_migrations` ledger records every
//! file whose statements all succeeded.
//!
//! Statements inside a file are not wrapped in a transaction. When statement
//! `k` fails, statements `1..k` stay applied and the file has no ledger
//! entry, so the next run starts it again from the first statement. Write
//! migration statements so they can be re-run (`IF NOT EXISTS` and friends).
//!
//! With a statement timeout configured, each statement runs in its own
//! transaction. Postgres enforces the limit itself through
//! `SET LOCAL statement_timeout`; on SQLite an abandoned statement is rolled
//! back when it finishes, so its effect never lands. Statements that cannot
//! run inside a transaction block (`CREATE INDEX CONCURRENTLY`, `VACUUM`)
//! need the timeout disabled.

mod discover;
mod ledger;
mod lock;
mod splitter;

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, TransactionTrait};
use tracing::{debug, info, warn};

pub use discover::{discover, MigrationFile};
pub use ledger::{Ledger, LedgerEntry};
pub use lock::{
    acquire, lock_for, pg_lock_id, MigrationLock, NoopLock, PgAdvisoryLock, SqliteFileLock,
};
pub use splitter::{split_statements, STATEMENT_SEPARATOR};

use super::error::{BootstrapError, StatementFailure};
use crate::config::{MigrationSettings, STATEMENT_CANCEL_GRACE_MILLIS};

/// Outcome of a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files applied by this run, in apply order
    pub applied: Vec<String>,
    /// Files already present in the ledger
    pub skipped: Vec<String>,
    /// Files without any executable statement; never recorded
    pub empty: Vec<String>,
    pub statements_executed: usize,
}

impl RunReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// A migration as seen by `migrate status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub filename: String,
    /// When it was recorded, `None` while pending
    pub applied_at: Option<DateTime<Utc>>,
    /// `false` for ledger entries whose file is gone
    pub on_disk: bool,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Applies pending migration files over a borrowed connection.
pub struct MigrationRunner<'a> {
    conn: &'a DatabaseConnection,
    settings: &'a MigrationSettings,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(conn: &'a DatabaseConnection, settings: &'a MigrationSettings) -> Self {
        Self { conn, settings }
    }

    /// Bring the schema up to date while holding `lock`.
    ///
    /// The lock is released on every path; a failed release is logged and
    /// never replaces the outcome of the run itself.
    pub async fn run(&self, lock: &mut dyn MigrationLock) -> Result<RunReport, BootstrapError> {
        acquire(lock, self.settings.lock_timeout).await?;

        let outcome = self.run_unlocked().await;

        if let Err(e) = lock.release().await {
            warn!(error = %e, "Failed to release migration lock");
        }

        outcome
    }

    /// Apply pending files without any cross-process exclusion.
    pub async fn run_unlocked(&self) -> Result<RunReport, BootstrapError> {
        let ledger = Ledger::new(self.conn);
        ledger.ensure().await?;

        let files = discover(&self.settings.dir).await?;
        let mut report = RunReport::default();

        for file in &files {
            self.apply(&ledger, file, &mut report).await?;
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            empty = report.empty.len(),
            statements = report.statements_executed,
            "Migrations complete"
        );

        Ok(report)
    }

    async fn apply(
        &self,
        ledger: &Ledger<'_>,
        file: &MigrationFile,
        report: &mut RunReport,
    ) -> Result<(), BootstrapError> {
        if ledger.is_applied(&file.filename).await? {
            debug!(filename = %file.filename, "Already applied, skipping");
            report.skipped.push(file.filename.clone());
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&file.path).await.map_err(|source| {
            BootstrapError::ReadMigration {
                filename: file.filename.clone(),
                source,
            }
        })?;

        let statements = split_statements(&content);
        if statements.is_empty() {
            warn!(filename = %file.filename, "Migration has no statements, skipping");
            report.empty.push(file.filename.clone());
            return Ok(());
        }

        info!(
            filename = %file.filename,
            statements = statements.len(),
            "Applying migration"
        );

        for (index, statement) in statements.iter().enumerate() {
            self.execute(statement).await.map_err(|source| {
                BootstrapError::StatementExecution {
                    filename: file.filename.clone(),
                    statement_index: index + 1,
                    statement: statement.to_string(),
                    source,
                }
            })?;
            report.statements_executed += 1;
        }

        ledger.record(&file.filename, Utc::now()).await?;
        report.applied.push(file.filename.clone());
        Ok(())
    }

    async fn execute(&self, statement: &str) -> Result<(), StatementFailure> {
        let Some(limit) = self.settings.statement_timeout else {
            self.conn.execute_unprepared(statement).await?;
            return Ok(());
        };

        // Postgres cancels on its own; the client timer only covers a server
        // that never answers.
        let backstop = match self.conn.get_database_backend() {
            DatabaseBackend::Postgres => {
                limit + Duration::from_millis(STATEMENT_CANCEL_GRACE_MILLIS)
            }
            _ => limit,
        };

        match tokio::time::timeout(backstop, self.execute_bounded(statement, limit)).await {
            Ok(result) => result.map_err(StatementFailure::from),
            Err(_) => Err(StatementFailure::TimedOut(limit)),
        }
    }

    /// Run one statement in its own transaction.
    ///
    /// Dropping the future before commit leaves a queued rollback behind, so
    /// a statement outliving the client timer is undone once it completes.
    async fn execute_bounded(&self, statement: &str, limit: Duration) -> Result<(), DbErr> {
        let txn = self.conn.begin().await?;
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            txn.execute_unprepared(&format!(
                "SET LOCAL statement_timeout = {}",
                limit.as_millis()
            ))
            .await?;
        }
        txn.execute_unprepared(statement).await?;
        txn.commit().await
    }
}

/// Every file of `dir` with its ledger state, followed by ledger entries whose
/// file no longer exists.
pub async fn migration_status(
    conn: &DatabaseConnection,
    dir: &Path,
) -> Result<Vec<MigrationStatus>, BootstrapError> {
    let ledger = Ledger::new(conn);
    ledger.ensure().await?;

    let files = discover(dir).await?;
    let mut entries = ledger.entries().await?;

    let on_disk: HashSet<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    let orphans: Vec<LedgerEntry> = entries
        .iter()
        .filter(|e| !on_disk.contains(e.filename.as_str()))
        .cloned()
        .collect();

    let mut statuses: Vec<MigrationStatus> = files
        .iter()
        .map(|file| {
            let applied_at = entries
                .iter()
                .position(|e| e.filename == file.filename)
                .map(|i| entries.swap_remove(i).applied_at);
            MigrationStatus {
                filename: file.filename.clone(),
                applied_at,
                on_disk: true,
            }
        })
        .collect();

    statuses.extend(orphans.into_iter().map(|e| MigrationStatus {
        filename: e.filename,
        applied_at: Some(e.applied_at),
        on_disk: false,
    }));

    Ok(statuses)
}
