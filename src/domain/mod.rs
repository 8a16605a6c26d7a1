//! Domain layer - Core business entities and logic
//!
//! Plain types with no knowledge of the database or HTTP.

pub mod action_log;
pub mod class;
pub mod course;
pub mod customer;
pub mod password;
pub mod user;

pub use action_log::ActionLog;
pub use class::{Class, ClassDraft};
pub use course::{Course, CourseDraft};
pub use customer::{Customer, CustomerDraft};
pub use password::Password;
pub use user::{User, UserResponse};
