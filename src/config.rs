// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

/// Upper bound on notes/text submitted to any generation endpoint (characters).
pub const MAX_TEXT_CHARS: usize = 100_000;

/// Upper bound on a single chat message (characters).
pub const MAX_MESSAGE_CHARS: usize = 4_000;

/// Upper bound on questions graded in one `/api/quiz-feedback` request.
pub const MAX_FEEDBACK_QUESTIONS: usize = 100;

/// Tolerance used when comparing a gateway-reported percentage with the local one.
pub const SCORE_TOLERANCE: f64 = 1e-6;

/// Quiz sessions untouched for this long are evicted.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Url,
    pub gateway_timeout_secs: u64,
    pub quiz_question_count: usize,
    pub session_idle_secs: u64,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .expect("GEMINI_API_KEY must be set");

        let gemini_model = env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        let gemini_base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());
        let gemini_base_url = Url::parse(&with_trailing_slash(&gemini_base_url))
            .expect("GEMINI_BASE_URL must be a valid URL");

        let gateway_timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let quiz_question_count = env::var("QUIZ_QUESTION_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(10);

        let session_idle_secs = env::var("SESSION_IDLE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_IDLE_SECS);

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            gateway_timeout_secs,
            quiz_question_count,
            session_idle_secs,
            database_url,
            bind_addr,
            cors_origins,
            rust_log,
        }
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

/// `Url::join` drops the last path segment unless the base ends with '/'.
fn with_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_skips_blanks() {
        let origins = parse_origins("http://a.test, ,http://b.test ,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(with_trailing_slash("http://x/v1"), "http://x/v1/");
        assert_eq!(with_trailing_slash("http://x/v1/"), "http://x/v1/");
    }
}
