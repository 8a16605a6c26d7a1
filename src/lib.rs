//! Course API - multi-tenant course management backend
//!
//! The process provisions its own database and brings the schema up to date
//! from plain SQL files before the HTTP server accepts any request.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases
//! - **infra**: Database bootstrap, migration runner and repositories
//! - **api**: HTTP handlers, middleware, and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Bootstrap the database and start the server
//! cargo run -- serve
//!
//! # Apply migrations only
//! cargo run -- migrate up
//!
//! # Show which migrations are applied
//! cargo run -- migrate status
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
