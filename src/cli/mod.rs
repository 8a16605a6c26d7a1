//! CLI module - Command-line interface for the application.
//!
//! - `serve` - bootstrap the database and start the HTTP server
//! - `migrate` - apply or inspect migrations without serving

pub mod args;

pub use args::{Cli, Commands};
