//! API middleware.

mod action_log;
mod auth;

pub use action_log::action_log_middleware;
pub use auth::{auth_middleware, require_self, CurrentUser};
