//! OpenAPI documentation configuration.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, class_handler, course_handler, customer_handler, health_handler, user_handler,
};
use crate::domain::{Class, Course, Customer, UserResponse};
use crate::services::LoginResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course API",
        version = "0.1.0",
        description = "User accounts, customers and course catalog over a self-migrating database"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        health_handler::health,
        auth_handler::register,
        auth_handler::login,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::change_password,
        course_handler::list_courses,
        course_handler::get_course,
        course_handler::create_course,
        course_handler::update_course,
        course_handler::delete_course,
        class_handler::list_course_classes,
        class_handler::get_class,
        class_handler::create_class,
        class_handler::update_class,
        class_handler::delete_class,
        customer_handler::list_customers,
        customer_handler::get_customer,
        customer_handler::get_customer_by_user,
        customer_handler::create_customer,
        customer_handler::update_customer,
        customer_handler::delete_customer,
    ),
    components(
        schemas(
            UserResponse,
            Course,
            Class,
            Customer,
            LoginResponse,
            health_handler::HealthResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateUserRequest,
            user_handler::ChangePasswordRequest,
            course_handler::CourseRequest,
            class_handler::ClassRequest,
            customer_handler::CreateCustomerRequest,
            customer_handler::UpdateCustomerRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "User registration and login"),
        (name = "Users", description = "User management operations"),
        (name = "Courses", description = "Course catalog"),
        (name = "Classes", description = "Lessons of a course"),
        (name = "Customers", description = "Customer profiles and their accounts")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
