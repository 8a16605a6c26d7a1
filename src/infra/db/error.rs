//! Errors raised while provisioning and migrating the database at startup.
//!
//! None of these are recovered locally: every variant aborts the startup
//! sequence and is reported by the process entry point.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// Startup (provisioning + migration) error taxonomy
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The server could not be reached or queried
    #[error("database connectivity error ({context}): {source}")]
    Connectivity {
        context: String,
        #[source]
        source: DbErr,
    },

    /// The target database could not be created
    #[error("failed to create database '{database}': {source}")]
    Provisioning {
        database: String,
        #[source]
        source: DbErr,
    },

    /// The `schema_migrations` ledger table could not be created or verified
    #[error("failed to initialize migration ledger: {0}")]
    LedgerInit(#[source] DbErr),

    /// The ledger was available but a read or write against it failed
    #[error("migration ledger error ({context}): {source}")]
    Ledger {
        context: String,
        #[source]
        source: DbErr,
    },

    /// The migrations directory could not be enumerated
    #[error("cannot read migrations directory '{}': {source}", .dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A discovered migration file could not be read
    #[error("cannot read migration file {filename}: {source}")]
    ReadMigration {
        filename: String,
        #[source]
        source: io::Error,
    },

    /// A single statement of a migration file failed; the run stops here
    #[error("migration {filename} failed at statement #{statement_index}: {source}\n--> {statement}")]
    StatementExecution {
        filename: String,
        /// 1-based position of the statement inside its file
        statement_index: usize,
        statement: String,
        #[source]
        source: StatementFailure,
    },

    /// The migration lock could not be acquired or queried
    #[error("migration lock error: {message}")]
    Lock { message: String },
}

/// Why a migration statement did not complete
#[derive(Debug, Error)]
pub enum StatementFailure {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("statement did not complete within {0:?}")]
    TimedOut(Duration),
}

impl BootstrapError {
    pub(crate) fn lock(message: impl Into<String>) -> Self {
        BootstrapError::Lock {
            message: message.into(),
        }
    }

    pub(crate) fn connectivity(context: impl Into<String>, source: DbErr) -> Self {
        BootstrapError::Connectivity {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn ledger(context: impl Into<String>, source: DbErr) -> Self {
        BootstrapError::Ledger {
            context: context.into(),
            source,
        }
    }

    /// Filename of the migration involved, when the error is tied to one.
    pub fn filename(&self) -> Option<&str> {
        match self {
            BootstrapError::StatementExecution { filename, .. }
            | BootstrapError::ReadMigration { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_error_carries_diagnostics() {
        let err = BootstrapError::StatementExecution {
            filename: "0002_add_col.sql".to_string(),
            statement_index: 3,
            statement: "ALTER TABLE t ADD COLUMN name text".to_string(),
            source: StatementFailure::TimedOut(Duration::from_secs(5)),
        };

        let rendered = err.to_string();
        assert!(rendered.contains("0002_add_col.sql"));
        assert!(rendered.contains("#3"));
        assert!(rendered.contains("ALTER TABLE t ADD COLUMN name text"));
        assert_eq!(err.filename(), Some("0002_add_col.sql"));
    }

    #[test]
    fn test_lock_error_has_no_filename() {
        let err = BootstrapError::lock("timed out");
        assert!(err.filename().is_none());
        assert_eq!(err.to_string(), "migration lock error: timed out");
    }
}
