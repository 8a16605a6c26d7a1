//! Application state shared by every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    ActionLogService, AuthService, ClassService, CourseService, CustomerService,
    ServiceContainer, Services, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub course_service: Arc<dyn CourseService>,
    pub class_service: Arc<dyn ClassService>,
    pub customer_service: Arc<dyn CustomerService>,
    pub action_log_service: Arc<dyn ActionLogService>,
    /// Pool handed over by the bootstrap phase; also used by the health check
    pub database: Database,
}

impl AppState {
    /// Build the real services over the migrated database.
    pub fn from_config(database: Database, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database)
    }

    /// Take services from any container (mocked ones in tests).
    pub fn from_container(container: &dyn ServiceContainer, database: Database) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            course_service: container.courses(),
            class_service: container.classes(),
            customer_service: container.customers(),
            action_log_service: container.action_logs(),
            database,
        }
    }
}
