//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Authentication & Security
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 8;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// Database
// =============================================================================

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_PASS: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "postgres";

/// Maintenance database used to check for and create the application database
pub const DEFAULT_DB_ADMIN_NAME: &str = "postgres";

/// Upper bound of the application pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 100;

/// Connections kept open by the application pool
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 5;

/// Seconds to wait for a pooled connection
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 8;

/// SQLite database name that selects a private in-memory database
pub const SQLITE_MEMORY: &str = ":memory:";

// =============================================================================
// Migrations
// =============================================================================

/// Directory scanned for `*.sql` migration files
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Extension a file must carry to be picked up as a migration
pub const MIGRATION_FILE_EXTENSION: &str = "sql";

/// Per-statement execution bound in seconds (0 disables the bound)
pub const DEFAULT_MIGRATION_STATEMENT_TIMEOUT_SECS: u64 = 120;

/// Extra client-side wait past a Postgres statement timeout before giving up on the server
pub const STATEMENT_CANCEL_GRACE_MILLIS: u64 = 2000;

/// How long a run waits for the migration lock before giving up
pub const DEFAULT_MIGRATION_LOCK_TIMEOUT_SECS: u64 = 30;

/// Prefix of the advisory lock key; the database name is appended
pub const MIGRATION_LOCK_NAMESPACE: &str = "course-api:migrate";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Minimum username length requirement
pub const MIN_USERNAME_LENGTH: u64 = 3;

// =============================================================================
// Action log
// =============================================================================

/// Largest request body buffered for the action log (axum's default body limit)
pub const ACTION_LOG_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Optional request header naming the caller's time zone
pub const TIMEZONE_HEADER: &str = "x-timezone";

/// JSON keys removed from logged request bodies, at any depth
pub const REDACTED_BODY_FIELDS: &[&str] = &["password"];
