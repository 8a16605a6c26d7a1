//! Infrastructure layer - External systems integration
//!
//! Database provisioning, the migration runner and repositories.

pub mod db;
pub mod repositories;

pub use db::{bootstrap, BootstrapError, Database};
pub use repositories::{
    ActionLogRepository, ActionLogStore, ClassRepository, ClassStore, CourseRepository,
    CourseStore, CustomerRepository, CustomerStore, UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockActionLogRepository, MockClassRepository, MockCourseRepository, MockCustomerRepository,
    MockUserRepository,
};
