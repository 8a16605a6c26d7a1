//! HTTP request handlers.

pub mod auth_handler;
pub mod class_handler;
pub mod course_handler;
pub mod customer_handler;
pub mod health_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use class_handler::class_routes;
pub use course_handler::course_routes;
pub use customer_handler::customer_routes;
pub use user_handler::user_routes;
