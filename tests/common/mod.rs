#![allow(dead_code)]

use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    routing::{delete, get, patch, post},
    Router,
};
use course_platform::{
    config::init_config,
    database::pool::{create_pool, run_migrations},
    middleware::auth::{optional_bearer_auth, require_bearer_auth, Claims},
    models::user::User,
    routes, AppState,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";
pub const BOUNDARY: &str = "----course-platform-test-boundary";

/// Connects to the database named by `DATABASE_URL`, applies migrations and
/// builds the router. Tests calling this are `#[ignore]`d and run with
/// `cargo test -- --ignored` against a live PostgreSQL.
pub async fn setup() -> (Router, PgPool) {
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", JWT_SECRET);
    // Several tests share one process; only the first call initializes.
    let _ = init_config();

    let pool = create_pool().await.expect("pool");
    run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(pool.clone());
    (app(state), pool)
}

pub fn app(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/api/courses", get(routes::courses::list_courses))
        .route("/api/courses/:id", get(routes::courses::get_course))
        .layer(axum::middleware::from_fn(optional_bearer_auth));

    let protected_api = Router::new()
        .route("/api/courses", post(routes::courses::create_course))
        .route("/api/courses/:id", patch(routes::courses::update_course))
        .route("/api/my-courses", get(routes::courses::my_courses))
        .route("/api/dashboard", get(routes::enrollment::dashboard))
        .route("/api/courses/:id/modules", post(routes::courses::add_module))
        .route(
            "/api/courses/:id/modules/:module_id",
            delete(routes::courses::delete_module),
        )
        .route("/api/courses/:id/enroll", post(routes::enrollment::enroll))
        .route(
            "/api/courses/:id/progress",
            get(routes::enrollment::course_progress),
        )
        .route(
            "/api/modules/:id/complete",
            post(routes::enrollment::complete_module),
        )
        .route(
            "/api/courses/:id/quizzes",
            get(routes::quizzes::list_quizzes).post(routes::quizzes::create_quiz),
        )
        .route(
            "/api/quizzes/:id",
            get(routes::quizzes::get_quiz)
                .patch(routes::quizzes::update_quiz)
                .delete(routes::quizzes::delete_quiz),
        )
        .route(
            "/api/quizzes/:id/import",
            post(routes::quizzes::import_questions),
        )
        .route("/api/quizzes/:id/take", get(routes::quiz_session::take_quiz))
        .route(
            "/api/quizzes/:id/submit",
            post(routes::quiz_session::submit_quiz),
        )
        .route(
            "/api/quizzes/:id/restart",
            post(routes::quiz_session::restart_quiz),
        )
        .route(
            "/api/quizzes/:id/result",
            get(routes::quiz_session::get_result),
        )
        .layer(axum::middleware::from_fn(require_bearer_auth));

    public_api.merge(protected_api).with_state(state)
}

pub async fn seed_user(pool: &PgPool, prefix: &str) -> Uuid {
    let tag = Uuid::new_v4().simple().to_string();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(format!("{}_{}", prefix, tag))
    .bind(format!("{}_{}@example.com", prefix, tag))
    .fetch_one(pool)
    .await
    .expect("seed user");
    user.id
}

pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub fn json_request(method: &str, uri: &str, user: Option<Uuid>, body: Option<JsonValue>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", format!("Bearer {}", token_for(user)));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn csv_upload(uri: &str, user: Uuid, csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"quiz.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        csv = csv
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token_for(user)))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(resp: Response<Body>) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    if bytes.is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
