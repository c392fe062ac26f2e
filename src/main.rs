use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use course_platform::{
    config::{get_config, init_config, LogFormat},
    database::pool::{create_pool, run_migrations},
    middleware::auth::{optional_bearer_auth, require_bearer_auth},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let pool = create_pool().await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool);

    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/courses", get(routes::courses::list_courses))
        .route("/api/courses/:id", get(routes::courses::get_course))
        .layer(axum::middleware::from_fn(optional_bearer_auth));

    let protected_api = Router::new()
        .route("/api/courses", post(routes::courses::create_course))
        .route(
            "/api/courses/:id",
            axum::routing::patch(routes::courses::update_course),
        )
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
            post(routes::quizzes::import_questions)
                .layer(DefaultBodyLimit::max(config.max_import_bytes)),
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

    let app = public_api
        .merge(protected_api)
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
