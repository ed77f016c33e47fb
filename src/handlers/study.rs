// src/handlers/study.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    extract::AppJson,
    gateway::ModelGateway,
    models::study::{ChatRequest, ChatResponse, SummaryResponse, TextRequest, TopicsResponse},
};

/// Summarizes study material into Markdown.
pub async fn summary(
    State(gateway): State<ModelGateway>,
    AppJson(payload): AppJson<TextRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let summary = gateway.summarize(&payload.text).await?;

    Ok(Json(SummaryResponse { summary }))
}

/// Lists the topics covered by study material.
pub async fn list_topics(
    State(gateway): State<ModelGateway>,
    AppJson(payload): AppJson<TextRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let topics = gateway.extract_topics(&payload.text).await?;

    Ok(Json(TopicsResponse { topics }))
}

/// Chat assistant. The reply is Markdown, rendered by the client.
pub async fn chatbot(
    State(gateway): State<ModelGateway>,
    AppJson(payload): AppJson<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reply = gateway
        .chat(&payload.message, payload.system_instruction.as_deref())
        .await?;

    Ok(Json(ChatResponse { reply }))
}

/// Liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
