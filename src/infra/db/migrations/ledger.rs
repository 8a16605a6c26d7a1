//! The `schema_migrations` ledger.
//!
//! One row per fully applied migration file. Rows are only ever inserted;
//! a filename is present iff every statement of that file succeeded.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{ColumnDef, Expr, Order, Query, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection, DeriveIden, FromQueryResult};

use crate::infra::db::error::BootstrapError;

#[derive(DeriveIden)]
enum SchemaMigrations {
    Table,
    Filename,
    AppliedAt,
}

/// A recorded migration
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct LedgerEntry {
    pub filename: String,
    pub applied_at: DateTime<Utc>,
}

/// Ledger access over a borrowed connection
pub struct Ledger<'a> {
    conn: &'a DatabaseConnection,
}

impl<'a> Ledger<'a> {
    pub fn new(conn: &'a DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create the ledger table if it does not exist yet. Safe on every startup.
    pub async fn ensure(&self) -> Result<(), BootstrapError> {
        let stmt = Table::create()
            .table(SchemaMigrations::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(SchemaMigrations::Filename)
                    .text()
                    .not_null()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(SchemaMigrations::AppliedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned();

        let backend = self.conn.get_database_backend();
        self.conn
            .execute(backend.build(&stmt))
            .await
            .map_err(BootstrapError::LedgerInit)?;
        Ok(())
    }

    /// Whether `filename` has already been applied.
    pub async fn is_applied(&self, filename: &str) -> Result<bool, BootstrapError> {
        let stmt = Query::select()
            .column(SchemaMigrations::Filename)
            .from(SchemaMigrations::Table)
            .and_where(Expr::col(SchemaMigrations::Filename).eq(filename))
            .limit(1)
            .to_owned();

        let backend = self.conn.get_database_backend();
        let row = self
            .conn
            .query_one(backend.build(&stmt))
            .await
            .map_err(|e| BootstrapError::ledger(format!("look up {}", filename), e))?;
        Ok(row.is_some())
    }

    /// Append the entry proving `filename` was fully applied.
    pub async fn record(
        &self,
        filename: &str,
        applied_at: DateTime<Utc>,
    ) -> Result<(), BootstrapError> {
        let stmt = Query::insert()
            .into_table(SchemaMigrations::Table)
            .columns([SchemaMigrations::Filename, SchemaMigrations::AppliedAt])
            .values_panic([filename.into(), applied_at.into()])
            .to_owned();

        let backend = self.conn.get_database_backend();
        self.conn
            .execute(backend.build(&stmt))
            .await
            .map_err(|e| BootstrapError::ledger(format!("record {}", filename), e))?;
        Ok(())
    }

    /// All entries, ordered by filename.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, BootstrapError> {
        let stmt = Query::select()
            .columns([SchemaMigrations::Filename, SchemaMigrations::AppliedAt])
            .from(SchemaMigrations::Table)
            .order_by(SchemaMigrations::Filename, Order::Asc)
            .to_owned();

        let backend = self.conn.get_database_backend();
        LedgerEntry::find_by_statement(backend.build(&stmt))
            .all(self.conn)
            .await
            .map_err(|e| BootstrapError::ledger("list entries", e))
    }
}
