//! Service container - wires repositories into services once per process.

use std::sync::Arc;

use super::{
    ActionLogService, ActionLogger, AuthService, Authenticator, ClassCatalog, ClassService,
    CourseCatalog, CourseService, CustomerDirectory, CustomerService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{ActionLogStore, ClassStore, CourseStore, CustomerStore, UserStore};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn courses(&self) -> Arc<dyn CourseService>;

    fn classes(&self) -> Arc<dyn ClassService>;

    fn customers(&self) -> Arc<dyn CustomerService>;

    fn action_logs(&self) -> Arc<dyn ActionLogService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub course_service: Arc<dyn CourseService>,
    pub class_service: Arc<dyn ClassService>,
    pub customer_service: Arc<dyn CustomerService>,
    pub action_log_service: Arc<dyn ActionLogService>,
}

impl Services {
    /// Build every service over the pool handed over by the bootstrap phase.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let users = Arc::new(UserStore::new(db.clone()));
        let courses = Arc::new(CourseStore::new(db.clone()));
        let classes = Arc::new(ClassStore::new(db.clone()));
        let customers = Arc::new(CustomerStore::new(db.clone()));
        let action_logs = Arc::new(ActionLogStore::new(db));

        let auth_service: Arc<dyn AuthService> =
            Arc::new(Authenticator::new(users.clone(), config));

        Self {
            user_service: Arc::new(UserManager::new(users)),
            course_service: Arc::new(CourseCatalog::new(courses.clone())),
            class_service: Arc::new(ClassCatalog::new(classes, courses)),
            customer_service: Arc::new(CustomerDirectory::new(customers, auth_service.clone())),
            action_log_service: Arc::new(ActionLogger::new(action_logs)),
            auth_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn courses(&self) -> Arc<dyn CourseService> {
        self.course_service.clone()
    }

    fn classes(&self) -> Arc<dyn ClassService> {
        self.class_service.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerService> {
        self.customer_service.clone()
    }

    fn action_logs(&self) -> Arc<dyn ActionLogService> {
        self.action_log_service.clone()
    }
}
