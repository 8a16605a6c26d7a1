//! Application services layer - Use cases and business logic.
//!
//! Services depend on repository traits so they can be tested with mocks.

mod action_log_service;
mod auth_service;
mod class_service;
pub mod container;
mod course_service;
mod customer_service;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use action_log_service::{ActionLogService, ActionLogger};
pub use auth_service::{AuthService, Authenticator, Claims, LoginResponse};
pub use class_service::{ClassCatalog, ClassService};
pub use course_service::{CourseCatalog, CourseService};
pub use customer_service::{CustomerDirectory, CustomerService, CustomerSignup};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
