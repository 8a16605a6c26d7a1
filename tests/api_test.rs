//! Integration tests for API endpoints.
//!
//! Real services run over mocked repositories; the database handle is an
//! in-memory SQLite pool used only by the health check.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use course_api::api::{create_router, AppState};
use course_api::config::{Config, DbSettings, MigrationSettings};
use course_api::domain::{
    ActionLog, Class, ClassDraft, Course, CourseDraft, Customer, Password, User,
};
use course_api::errors::AppError;
use course_api::infra::{
    Database, MockActionLogRepository, MockClassRepository, MockCourseRepository,
    MockCustomerRepository, MockUserRepository,
};
use course_api::services::{
    ActionLogService, ActionLogger, AuthService, Authenticator, ClassCatalog, ClassService,
    CourseCatalog, CourseService, CustomerDirectory, CustomerService, MockServiceContainer,
    Services, UserManager, UserService,
};

const PASSWORD: &str = "SecurePass123!";

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config() -> Config {
    Config::new(
        DbSettings::sqlite(":memory:"),
        MigrationSettings::default(),
        "test-secret-key-for-testing-only-32chars",
    )
}

async fn memory_database() -> Database {
    Database::connect(&DbSettings::sqlite(":memory:"))
        .await
        .expect("open in-memory database")
}

fn known_user() -> User {
    let hash = Password::new(PASSWORD).unwrap().into_string();
    User::new(Uuid::new_v4(), "marta".to_string(), hash, false)
}

/// Users repository that knows exactly one account
fn users_repo(user: &User) -> MockUserRepository {
    let mut repo = MockUserRepository::new();
    let by_name = user.clone();
    repo.expect_find_by_username()
        .returning(move |name| Ok((name == by_name.username).then(|| by_name.clone())));
    let by_id = user.clone();
    repo.expect_find_by_id()
        .returning(move |id| Ok((id == by_id.id).then(|| by_id.clone())));
    repo
}

/// Mocked repositories behind one router
struct Repos {
    users: MockUserRepository,
    courses: MockCourseRepository,
    classes: MockClassRepository,
    customers: MockCustomerRepository,
    action_logs: MockActionLogRepository,
}

/// Action log that accepts every entry
fn accepting_action_logs() -> MockActionLogRepository {
    let mut logs = MockActionLogRepository::new();
    logs.expect_record().returning(|_| Ok(()));
    logs
}

/// Action log that keeps every entry for inspection
fn capturing_action_logs() -> (MockActionLogRepository, Arc<Mutex<Vec<ActionLog>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut logs = MockActionLogRepository::new();
    logs.expect_record().returning(move |entry| {
        sink.lock().unwrap().push(entry);
        Ok(())
    });
    (logs, seen)
}

fn repos(users: MockUserRepository, courses: MockCourseRepository) -> Repos {
    Repos {
        users,
        courses,
        classes: MockClassRepository::new(),
        customers: MockCustomerRepository::new(),
        action_logs: accepting_action_logs(),
    }
}

async fn app(users: MockUserRepository, courses: MockCourseRepository) -> (Router, Database) {
    app_with(repos(users, courses)).await
}

async fn app_with(repos: Repos) -> (Router, Database) {
    let users = Arc::new(repos.users);
    let courses = Arc::new(repos.courses);
    let auth_service: Arc<dyn AuthService> =
        Arc::new(Authenticator::new(users.clone(), test_config()));

    let services = Services {
        user_service: Arc::new(UserManager::new(users)),
        course_service: Arc::new(CourseCatalog::new(courses.clone())),
        class_service: Arc::new(ClassCatalog::new(Arc::new(repos.classes), courses)),
        customer_service: Arc::new(CustomerDirectory::new(
            Arc::new(repos.customers),
            auth_service.clone(),
        )),
        action_log_service: Arc::new(ActionLogger::new(Arc::new(repos.action_logs))),
        auth_service,
    };
    let database = memory_database().await;
    let state = AppState::from_container(&services, database.clone());
    (create_router(state), database)
}

fn sample_course(id: Uuid) -> Course {
    Course::from_draft(
        id,
        CourseDraft {
            title: "Agility".to_string(),
            description: "Jumps and tunnels".to_string(),
            image_url: String::new(),
            is_active: true,
        },
    )
}

fn sample_class(course_id: Uuid, order: i32) -> Class {
    Class::from_draft(
        Uuid::new_v4(),
        ClassDraft {
            course_id,
            title: format!("Lesson {order}"),
            content: "Practice".to_string(),
            video_url: "https://cdn.example.com/v.mp4".to_string(),
            material_url: "https://cdn.example.com/m.pdf".to_string(),
            order,
            is_active: true,
        },
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "marta", "password": PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

// =============================================================================
// Public Endpoints
// =============================================================================

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _db) = app(MockUserRepository::new(), MockCourseRepository::new()).await;

    let response = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let (app, db) = app(MockUserRepository::new(), MockCourseRepository::new()).await;

    let (status, body) = send(&app, get("/auth/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "healthy");

    db.close().await.unwrap();

    let (status, body) = send(&app, get("/auth/health", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unhealthy");
}

#[tokio::test]
async fn test_health_hides_driver_error_text() {
    let (app, db) = app(MockUserRepository::new(), MockCourseRepository::new()).await;
    let handle = db.clone();
    db.close().await.unwrap();
    let driver_error = handle.ping().await.unwrap_err().to_string();

    let (status, body) = send(&app, get("/auth/health", None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "database unreachable");
    assert!(!body.to_string().contains(&driver_error));
}

#[tokio::test]
async fn test_register_validates_payload() {
    let (app, _db) = app(MockUserRepository::new(), MockCourseRepository::new()).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "username": "marta", "password": "short" }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _db) = app(MockUserRepository::new(), MockCourseRepository::new()).await;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\":"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_creates_user() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().returning(|_| Ok(None));
    users.expect_create().returning(Ok);
    let (app, _db) = app(users, MockCourseRepository::new()).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "username": "leo", "password": PASSWORD, "is_customer": true }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "leo");
    assert_eq!(body["is_customer"], true);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let user = known_user();
    let (app, _db) = app(users_repo(&user), MockCourseRepository::new()).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "marta", "password": "wrong-password" }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

// =============================================================================
// Protected Endpoints
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _db) = app(MockUserRepository::new(), MockCourseRepository::new()).await;

    for uri in ["/api/users", "/api/courses"] {
        let (status, body) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    let (status, _) = send(&app, get("/api/courses", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_courses_with_token() {
    let user = known_user();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_list()
        .returning(|| Ok(vec![sample_course(Uuid::new_v4())]));
    let (app, _db) = app(users_repo(&user), courses).await;
    let token = login(&app).await;

    let (status, body) = send(&app, get("/api/courses", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Agility");
}

#[tokio::test]
async fn test_missing_course_is_not_found() {
    let user = known_user();
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().returning(|_| Ok(None));
    let (app, _db) = app(users_repo(&user), courses).await;
    let token = login(&app).await;

    let uri = format!("/api/courses/{}", Uuid::new_v4());
    let (status, body) = send(&app, get(&uri, Some(&token))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_cannot_delete_another_account() {
    let user = known_user();
    let mut users = users_repo(&user);
    users.expect_deactivate().never();
    let (app, _db) = app(users, MockCourseRepository::new()).await;
    let token = login(&app).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/users/{}", Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_delete_own_account() {
    let user = known_user();
    let user_id = user.id;
    let mut users = users_repo(&user);
    users.expect_deactivate().times(1).returning(|_| Ok(()));
    let (app, _db) = app(users, MockCourseRepository::new()).await;
    let token = login(&app).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/users/{user_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// =============================================================================
// Container wiring
// =============================================================================

#[tokio::test]
async fn test_state_takes_services_from_container() {
    let user = known_user();
    let users = Arc::new(users_repo(&user));
    let courses = Arc::new(MockCourseRepository::new());

    let mut container = MockServiceContainer::new();
    let auth: Arc<dyn AuthService> = Arc::new(Authenticator::new(users.clone(), test_config()));
    let user_service: Arc<dyn UserService> = Arc::new(UserManager::new(users));
    let course_service: Arc<dyn CourseService> = Arc::new(CourseCatalog::new(courses.clone()));
    let class_service: Arc<dyn ClassService> = Arc::new(ClassCatalog::new(
        Arc::new(MockClassRepository::new()),
        courses,
    ));
    let customer_service: Arc<dyn CustomerService> = Arc::new(CustomerDirectory::new(
        Arc::new(MockCustomerRepository::new()),
        auth.clone(),
    ));
    let action_log_service: Arc<dyn ActionLogService> =
        Arc::new(ActionLogger::new(Arc::new(accepting_action_logs())));

    container.expect_auth().times(1).returning(move || auth.clone());
    container
        .expect_users()
        .times(1)
        .returning(move || user_service.clone());
    container
        .expect_courses()
        .times(1)
        .returning(move || course_service.clone());
    container
        .expect_classes()
        .times(1)
        .returning(move || class_service.clone());
    container
        .expect_customers()
        .times(1)
        .returning(move || customer_service.clone());
    container
        .expect_action_logs()
        .times(1)
        .returning(move || action_log_service.clone());

    let state = AppState::from_container(&container, memory_database().await);
    let app = create_router(state);

    let token = login(&app).await;
    assert!(!token.is_empty());
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn test_create_customer_opens_customer_account() {
    let user = known_user();
    let mut users = users_repo(&user);
    users
        .expect_create()
        .withf(|u| u.username == "jordi" && u.is_customer)
        .times(1)
        .returning(Ok);
    let mut customers = MockCustomerRepository::new();
    customers
        .expect_create()
        .withf(|c| c.name == "Jordi" && c.is_active)
        .times(1)
        .returning(Ok);

    let (app, _db) = app_with(Repos {
        customers,
        ..repos(users, MockCourseRepository::new())
    })
    .await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/customers",
            json!({
                "name": "Jordi",
                "surname": "Vila",
                "phone_number": "+34 600 111 222",
                "email": "jordi@example.com",
                "username": "jordi",
                "password": "AnotherPass123!"
            }),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["surname"], "Vila");
    assert_eq!(body["email"], "jordi@example.com");
    assert!(body["user_id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_customer_rejects_bad_email() {
    let user = known_user();
    let (app, _db) = app(users_repo(&user), MockCourseRepository::new()).await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/customers",
            json!({
                "name": "Jordi",
                "surname": "Vila",
                "phone_number": "+34 600 111 222",
                "email": "not-an-email",
                "username": "jordi",
                "password": "AnotherPass123!"
            }),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customer_lookup_by_user() {
    let user = known_user();
    let user_id = user.id;
    let mut customers = MockCustomerRepository::new();
    customers.expect_find_by_user_id().returning(move |id| {
        Ok((id == user_id).then(|| Customer {
            id: Uuid::new_v4(),
            user_id,
            name: "Marta".to_string(),
            surname: "Puig".to_string(),
            phone_number: None,
            email: None,
            is_active: true,
        }))
    });
    let (app, _db) = app_with(Repos {
        customers,
        ..repos(users_repo(&user), MockCourseRepository::new())
    })
    .await;
    let token = login(&app).await;

    let uri = format!("/api/customers/user/{user_id}");
    let (status, body) = send(&app, get(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Marta");

    let uri = format!("/api/customers/user/{}", Uuid::new_v4());
    let (status, _) = send(&app, get(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Classes
// =============================================================================

#[tokio::test]
async fn test_classes_by_course_are_routed_past_course_id() {
    let user = known_user();
    let course_id = Uuid::new_v4();
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_id()
        .returning(move |id| Ok((id == course_id).then(|| sample_course(id))));
    let mut classes = MockClassRepository::new();
    classes
        .expect_list_by_course()
        .returning(|course_id| Ok(vec![sample_class(course_id, 1), sample_class(course_id, 2)]));

    let (app, _db) = app_with(Repos {
        classes,
        ..repos(users_repo(&user), courses)
    })
    .await;
    let token = login(&app).await;

    let uri = format!("/api/courses/classes/bycourse/{course_id}");
    let (status, body) = send(&app, get(&uri, Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["order"], 1);
    assert_eq!(body[1]["title"], "Lesson 2");
}

#[tokio::test]
async fn test_class_for_missing_course_is_not_found() {
    let user = known_user();
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_id().returning(|_| Ok(None));
    let mut classes = MockClassRepository::new();
    classes.expect_create().never();

    let (app, _db) = app_with(Repos {
        classes,
        ..repos(users_repo(&user), courses)
    })
    .await;
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/courses/classes",
            json!({
                "course_id": Uuid::new_v4(),
                "title": "Sit",
                "content": "Hold the treat high",
                "video_url": "https://cdn.example.com/v.mp4",
                "material_url": "https://cdn.example.com/m.pdf",
                "order": 1
            }),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Action log
// =============================================================================

#[tokio::test]
async fn test_action_log_records_caller_without_password() {
    let user = known_user();
    let user_id = user.id;
    let mut courses = MockCourseRepository::new();
    courses.expect_create().times(1).returning(Ok);
    let (action_logs, seen) = capturing_action_logs();

    let (app, _db) = app_with(Repos {
        action_logs,
        ..repos(users_repo(&user), courses)
    })
    .await;
    let token = login(&app).await;

    let mut request = json_request(
        "POST",
        "/api/courses",
        json!({
            "title": "Scent work",
            "description": "Finding things",
            "image_url": "https://cdn.example.com/scent.png",
            "password": "should-not-be-logged"
        }),
        Some(&token),
    );
    request
        .headers_mut()
        .insert("x-timezone", "Europe/Madrid".parse().unwrap());
    let (status, body) = send(&app, request).await;

    // The handler still sees the full body.
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Scent work");

    let entries = seen.lock().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.action_type, "POST /api/courses");
    assert_eq!(entry.user_id, Some(user_id));
    assert_eq!(entry.timezone, "Europe/Madrid");
    assert!(!entry.metadata.contains("password"));
    assert!(!entry.metadata.contains("should-not-be-logged"));
    let metadata: Value = serde_json::from_str(&entry.metadata).unwrap();
    assert_eq!(metadata["title"], "Scent work");
}

#[tokio::test]
async fn test_action_log_failure_does_not_fail_request() {
    let user = known_user();
    let mut courses = MockCourseRepository::new();
    courses.expect_list().returning(|| Ok(Vec::new()));
    let mut action_logs = MockActionLogRepository::new();
    action_logs
        .expect_record()
        .times(1)
        .returning(|_| Err(AppError::internal("action_logs unavailable")));

    let (app, _db) = app_with(Repos {
        action_logs,
        ..repos(users_repo(&user), courses)
    })
    .await;
    let token = login(&app).await;

    let (status, _) = send(&app, get("/api/courses", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_token_is_not_action_logged() {
    let mut action_logs = MockActionLogRepository::new();
    action_logs.expect_record().never();

    let (app, _db) = app_with(Repos {
        action_logs,
        ..repos(MockUserRepository::new(), MockCourseRepository::new())
    })
    .await;

    let (status, _) = send(&app, get("/api/courses", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
