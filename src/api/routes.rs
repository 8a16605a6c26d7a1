//! Application route configuration.

use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{auth_routes, class_routes, course_routes, customer_routes, user_routes};
use super::middleware::{action_log_middleware, auth_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Authentication wraps the action log, so entries carry the caller.
    let protected = |routes: Router<AppState>| {
        routes
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                action_log_middleware,
            ))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
    };

    Router::new()
        .route("/", get(root))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public: health, register, login
        .nest("/auth", auth_routes())
        // Bearer token required
        .nest(
            "/api",
            Router::new()
                .nest("/users", protected(user_routes()))
                .nest("/customers", protected(customer_routes()))
                .nest("/courses", protected(course_routes().merge(class_routes()))),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "course-api"
}
