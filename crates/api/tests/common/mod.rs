#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use autochrone_api::auth::password::hash_password;
use autochrone_api::auth::token::{TokenAuthority, TokenConfig};
use autochrone_api::config::ServerConfig;
use autochrone_api::routes;
use autochrone_api::state::AppState;
use autochrone_core::memory::MemoryRepository;
use autochrone_core::repository::Repository;
use autochrone_core::user::{NewUser, User};

pub const TEST_SECRET: &[u8] = b"integration-test-signing-key";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        token: TokenConfig {
            signing_key_file: "unused-in-tests".into(),
            ttl_mins: 15,
        },
    }
}

/// Everything a test needs: the router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub tokens: Arc<TokenAuthority>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router on an in-memory repository.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let repo = Arc::new(MemoryRepository::new());
    let tokens = Arc::new(
        TokenAuthority::from_secret(TEST_SECRET, config.token.ttl_mins)
            .expect("test key is valid"),
    );

    let state = AppState {
        repo: repo.clone(),
        config: Arc::new(config),
        tokens: tokens.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:4200".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([LOCATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    TestApp {
        router,
        repo,
        tokens,
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the default scopes.
pub async fn seed_user(app: &TestApp, username: &str) -> User {
    let hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    app.repo
        .insert_user(&NewUser::new(username, hash))
        .await
        .expect("user insert should succeed")
}

/// Seed a user and return a `basic` token issued to them.
pub async fn seed_user_with_token(app: &TestApp, username: &str) -> (User, String) {
    let user = seed_user(app, username).await;
    let token = app
        .tokens
        .issue(&user, "basic")
        .expect("token issue should succeed");
    (user, token)
}

/// Project body with sensible defaults.
pub fn project_body(slug: &str) -> serde_json::Value {
    serde_json::json!({
        "name": format!("Project {slug}"),
        "slug": slug,
        "dateStart": "2025-01-01",
        "dateEnd": "2025-12-31",
        "wordCountStart": 0,
        "wordCountGoal": 50000,
    })
}

/// Create a project through the API and assert it was created.
pub async fn create_project(app: &TestApp, username: &str, token: &str, slug: &str) {
    let response = post_json_auth(
        app.router(),
        &format!("/api/v1/users/{username}/projects"),
        project_body(slug),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Create a sprint through the API and return its JSON.
pub async fn create_sprint(
    app: &TestApp,
    username: &str,
    token: &str,
    project: &str,
    time_start: &str,
    duration: i32,
    pomodoro_break: i32,
) -> serde_json::Value {
    let response = post_json_auth(
        app.router(),
        &format!("/api/v1/users/{username}/projects/{project}/sprints"),
        serde_json::json!({
            "timeStart": time_start,
            "duration": duration,
            "break": pomodoro_break,
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Send a request with a raw `Authorization` header value.
pub async fn post_json_with_header(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    authorization: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, authorization)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect the response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
