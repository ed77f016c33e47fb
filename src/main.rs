// src/main.rs

use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use studybuddy::config::Config;
use studybuddy::coverage::{CoverageStore, CoverageTracker, InMemoryCoverageStore, PgCoverageStore};
use studybuddy::gateway::{GeminiClient, ModelGateway};
use studybuddy::quiz::registry::SessionRegistry;
use studybuddy::routes;
use studybuddy::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Topic coverage lives in Postgres when configured, in memory otherwise
    let store: Arc<dyn CoverageStore> = match &config.database_url {
        Some(database_url) => {
            let pool = connect_with_retry(database_url).await;

            tracing::info!("Running migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Migrations applied successfully.");

            Arc::new(PgCoverageStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; topic coverage is kept in memory only");
            Arc::new(InMemoryCoverageStore::new())
        }
    };

    let client = GeminiClient::new(&config).expect("Failed to create Gemini client");
    let gateway = ModelGateway::new(Arc::new(client), config.quiz_question_count);

    // Create AppState
    let state = AppState {
        gateway,
        sessions: Arc::new(SessionRegistry::with_idle_ttl(config.session_idle_ttl())),
        coverage: Arc::new(CoverageTracker::new(store)),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}

async fn connect_with_retry(database_url: &str) -> PgPool {
    let mut retry_count = 0;
    loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("Database connected...");
                return pool;
            }
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}
