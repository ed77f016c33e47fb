// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{coverage, quiz, session, study},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Stateless generation endpoints live directly under `/api`.
/// * Quiz sessions and topic coverage are nested sub-routers.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let study_routes = Router::new()
        .route("/generate-quiz", post(quiz::generate_quiz))
        .route("/quiz-feedback", post(quiz::quiz_feedback))
        .route("/summary", post(study::summary))
        .route("/list-topics", post(study::list_topics))
        .route("/chatbot", post(study::chatbot));

    let session_routes = Router::new()
        .route("/", post(session::create_session))
        .route(
            "/{id}",
            get(session::get_session).delete(session::delete_session),
        )
        .route(
            "/{id}/quiz",
            post(session::start_quiz).delete(session::reset_quiz),
        )
        .route("/{id}/answer", post(session::select_answer))
        .route("/{id}/advance", post(session::advance))
        .route("/{id}/retreat", post(session::retreat))
        .route("/{id}/score", get(session::score));

    let coverage_routes = Router::new()
        .route(
            "/{document}",
            get(coverage::get_coverage).delete(coverage::reset_coverage),
        )
        .route("/{document}/topics", post(coverage::register_topics))
        .route("/{document}/toggle", post(coverage::toggle_topic));

    Router::new()
        .route("/health", get(study::health))
        .nest("/api", study_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/coverage", coverage_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
