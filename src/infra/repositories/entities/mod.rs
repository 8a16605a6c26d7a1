//! SeaORM entity definitions
//!
//! Mirror the tables created by `migrations/*.sql`; they never create schema.

pub mod action_log;
pub mod class;
pub mod course;
pub mod customer;
pub mod user;
