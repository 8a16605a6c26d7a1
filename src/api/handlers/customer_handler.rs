//! Customer profile handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Customer, CustomerDraft};
use crate::errors::AppResult;
use crate::services::CustomerSignup;

/// New customer: profile plus the credentials of its account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Marta")]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Surname is required"))]
    #[schema(example = "Puig")]
    pub surname: String,
    #[validate(length(min = 1, max = 50, message = "Phone number is required"))]
    #[schema(example = "+34 600 000 000")]
    pub phone_number: String,
    #[validate(email(message = "Email must be a valid address"))]
    #[schema(example = "marta@example.com")]
    pub email: String,
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[schema(example = "marta", min_length = 3)]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

/// Replacement profile fields; the account is not touched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Surname is required"))]
    pub surname: String,
    #[validate(length(min = 1, max = 50, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

impl From<UpdateCustomerRequest> for CustomerDraft {
    fn from(req: UpdateCustomerRequest) -> Self {
        CustomerDraft {
            name: req.name,
            surname: req.surname,
            phone_number: Some(req.phone_number),
            email: Some(req.email),
        }
    }
}

impl From<CreateCustomerRequest> for CustomerSignup {
    fn from(req: CreateCustomerRequest) -> Self {
        CustomerSignup {
            username: req.username,
            password: req.password,
            profile: CustomerDraft {
                name: req.name,
                surname: req.surname,
                phone_number: Some(req.phone_number),
                email: Some(req.email),
            },
        }
    }
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/user/:user_id", get(get_customer_by_user))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All customers", body = Vec<Customer>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    Ok(Json(state.customer_service.list_customers().await?))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    Ok(Json(state.customer_service.get_customer(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/customers/user/{user_id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "ID of the customer's user account")),
    responses(
        (status = 200, description = "Customer owning the account", body = Customer),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No customer for this account")
    )
)]
pub async fn get_customer_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    Ok(Json(state.customer_service.get_customer_by_user(user_id).await?))
}

/// Open a customer account and its profile
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    security(("bearer_auth" = [])),
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCustomerRequest>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = state.customer_service.create_customer(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerRequest>,
) -> AppResult<Json<Customer>> {
    Ok(Json(
        state.customer_service.update_customer(id, payload.into()).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.customer_service.delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
