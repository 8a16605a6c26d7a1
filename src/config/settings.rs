//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::constants::{
    DEFAULT_DB_ACQUIRE_TIMEOUT_SECS, DEFAULT_DB_ADMIN_NAME, DEFAULT_DB_HOST,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_MIN_CONNECTIONS, DEFAULT_DB_NAME, DEFAULT_DB_PASS,
    DEFAULT_DB_PORT, DEFAULT_DB_USER, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_MIGRATIONS_DIR, DEFAULT_MIGRATION_LOCK_TIMEOUT_SECS,
    DEFAULT_MIGRATION_STATEMENT_TIMEOUT_SECS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH, SQLITE_MEMORY,
};

/// Database engine the service runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

impl FromStr for DbEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DbEngine::Postgres),
            "sqlite" => Ok(DbEngine::Sqlite),
            other => Err(format!("unsupported DB_ENGINE '{}'", other)),
        }
    }
}

/// Connection settings for the administrative and application databases
#[derive(Clone)]
pub struct DbSettings {
    pub engine: DbEngine,
    pub host: String,
    pub port: u16,
    pub user: String,
    password: String,
    /// Target database name; a file path for SQLite
    pub name: String,
    /// Maintenance database the provisioning phase connects to
    pub admin_name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl std::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("admin_name", &self.admin_name)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl DbSettings {
    /// Postgres settings with default pool sizing.
    pub fn postgres(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            engine: DbEngine::Postgres,
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            name: name.into(),
            admin_name: DEFAULT_DB_ADMIN_NAME.to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// SQLite settings; `path` is the database file or `:memory:`.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            engine: DbEngine::Sqlite,
            host: String::new(),
            port: 0,
            user: String::new(),
            password: String::new(),
            name: path.into(),
            admin_name: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// Connection URL of the target application database.
    pub fn app_url(&self) -> String {
        match self.engine {
            DbEngine::Postgres => self.postgres_url(&self.name),
            DbEngine::Sqlite if self.is_in_memory() => "sqlite::memory:".to_string(),
            DbEngine::Sqlite => format!("sqlite://{}", self.name),
        }
    }

    /// Connection URL of the administrative database.
    ///
    /// SQLite has no server-side catalog; provisioning works on the filesystem.
    pub fn admin_url(&self) -> Option<String> {
        match self.engine {
            DbEngine::Postgres => Some(self.postgres_url(&self.admin_name)),
            DbEngine::Sqlite => None,
        }
    }

    /// Database file backing a SQLite configuration.
    pub fn sqlite_path(&self) -> Option<PathBuf> {
        match self.engine {
            DbEngine::Sqlite if !self.is_in_memory() => Some(PathBuf::from(&self.name)),
            _ => None,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.engine == DbEngine::Sqlite && self.name == SQLITE_MEMORY
    }

    fn postgres_url(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            utf8_percent_encode(&self.user, NON_ALPHANUMERIC),
            utf8_percent_encode(&self.password, NON_ALPHANUMERIC),
            self.host,
            self.port,
            utf8_percent_encode(database, NON_ALPHANUMERIC),
        )
    }
}

/// Settings of the startup migration run
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub dir: PathBuf,
    /// Upper bound for a single statement; `None` waits indefinitely
    pub statement_timeout: Option<Duration>,
    pub lock_timeout: Duration,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            statement_timeout: Some(Duration::from_secs(
                DEFAULT_MIGRATION_STATEMENT_TIMEOUT_SECS,
            )),
            lock_timeout: Duration::from_secs(DEFAULT_MIGRATION_LOCK_TIMEOUT_SECS),
        }
    }
}

impl MigrationSettings {
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub db: DbSettings,
    pub migrations: MigrationSettings,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("db", &self.db)
            .field("migrations", &self.migrations)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Build a configuration from explicit parts, keeping server defaults.
    pub fn new(db: DbSettings, migrations: MigrationSettings, jwt_secret: impl Into<String>) -> Self {
        Self {
            db,
            migrations,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement),
    /// or if DB_ENGINE names an unsupported engine.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let engine = env::var("DB_ENGINE")
            .ok()
            .map(|v| v.parse::<DbEngine>().unwrap_or_else(|e| panic!("{}", e)))
            .unwrap_or(DbEngine::Postgres);

        let db = DbSettings {
            engine,
            host: env::var("DB_HOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string()),
            port: env_parse("DB_PORT", DEFAULT_DB_PORT),
            user: env::var("DB_USER").unwrap_or_else(|_| DEFAULT_DB_USER.to_string()),
            password: env::var("DB_PASS").unwrap_or_else(|_| DEFAULT_DB_PASS.to_string()),
            name: env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            admin_name: env::var("DB_ADMIN_NAME")
                .unwrap_or_else(|_| DEFAULT_DB_ADMIN_NAME.to_string()),
            max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            min_connections: env_parse("DB_MIN_CONNECTIONS", DEFAULT_DB_MIN_CONNECTIONS),
            acquire_timeout: Duration::from_secs(env_parse(
                "DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
            )),
        };

        let statement_timeout_secs: u64 = env_parse(
            "MIGRATION_STATEMENT_TIMEOUT_SECS",
            DEFAULT_MIGRATION_STATEMENT_TIMEOUT_SECS,
        );

        let migrations = MigrationSettings {
            dir: env::var("MIGRATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MIGRATIONS_DIR)),
            statement_timeout: (statement_timeout_secs > 0)
                .then(|| Duration::from_secs(statement_timeout_secs)),
            lock_timeout: Duration::from_secs(env_parse(
                "MIGRATION_LOCK_TIMEOUT_SECS",
                DEFAULT_MIGRATION_LOCK_TIMEOUT_SECS,
            )),
        };

        Self {
            db,
            migrations,
            jwt_secret,
            jwt_expiration_hours: env_parse("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env_parse("API_PORT", DEFAULT_SERVER_PORT),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse an environment variable, falling back to `default` when unset or malformed.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
