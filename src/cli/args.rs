//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Course management API with a self-migrating database
#[derive(Parser, Debug)]
#[command(name = "course-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision and migrate the database, then start the HTTP server
    Serve(ServeArgs),

    /// Run or inspect database migrations
    Migrate(MigrateArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, env = "SERVER_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "API_PORT")]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Create the database if needed and apply pending migrations
    Up(MigrationDirArg),
    /// List migrations with their applied time
    Status(MigrationDirArg),
}

#[derive(Args, Debug)]
pub struct MigrationDirArg {
    /// Directory holding the `*.sql` files (overrides MIGRATIONS_DIR)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_up_with_dir() {
        let cli = Cli::parse_from(["course-api", "migrate", "up", "--dir", "db/changes"]);

        match cli.command {
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Up(arg),
            }) => assert_eq!(arg.dir, Some(PathBuf::from("db/changes"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::parse_from(["course-api", "--verbose", "serve", "-p", "9000"]);

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve(ServeArgs { port: Some(9000), .. })));
    }
}
