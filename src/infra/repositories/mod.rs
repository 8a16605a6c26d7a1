//! Repository layer - Data access abstraction
//!
//! Repositories read and write the tables the migration runner created.

mod action_log_repository;
mod class_repository;
mod course_repository;
mod customer_repository;
pub(crate) mod entities;
mod user_repository;

pub use action_log_repository::{ActionLogRepository, ActionLogStore};
pub use class_repository::{ClassRepository, ClassStore};
pub use course_repository::{CourseRepository, CourseStore};
pub use customer_repository::{CustomerRepository, CustomerStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use action_log_repository::MockActionLogRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use class_repository::MockClassRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use course_repository::MockCourseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use customer_repository::MockCustomerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
