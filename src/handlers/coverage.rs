// src/handlers/coverage.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    coverage::{CoverageTracker, document_key},
    error::AppError,
    extract::AppJson,
    models::coverage::{RegisterTopicsRequest, ToggleTopicRequest},
};

/// Returns the topic coverage of a document (empty if never recorded).
pub async fn get_coverage(
    State(coverage): State<Arc<CoverageTracker>>,
    Path(document): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = document_key(&document)?;

    Ok(Json(coverage.load(&key).await?))
}

/// Adds topics (e.g. from `/api/list-topics`) as not yet covered.
pub async fn register_topics(
    State(coverage): State<Arc<CoverageTracker>>,
    Path(document): Path<String>,
    AppJson(payload): AppJson<RegisterTopicsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let key = document_key(&document)?;

    let state = coverage.register_topics(&key, &payload.topics).await?;

    Ok(Json(state))
}

/// Manually flips the covered flag of one topic.
pub async fn toggle_topic(
    State(coverage): State<Arc<CoverageTracker>>,
    Path(document): Path<String>,
    AppJson(payload): AppJson<ToggleTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let key = document_key(&document)?;

    let state = coverage.toggle(&key, &payload.topic).await?;

    Ok(Json(state))
}

/// Explicit reset: forgets every topic of the document.
pub async fn reset_coverage(
    State(coverage): State<Arc<CoverageTracker>>,
    Path(document): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = document_key(&document)?;

    if coverage.reset(&key).await? {
        tracing::info!(document = %key, "Topic coverage reset");
    }

    Ok(StatusCode::NO_CONTENT)
}
