// src/handlers/session.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    coverage::{CoverageTracker, document_key},
    error::AppError,
    extract::AppJson,
    gateway::ModelGateway,
    models::session::{CreatedSession, SelectAnswerRequest, StartQuizRequest},
    quiz::{
        registry::SessionRegistry,
        session::{Advance, SessionState},
    },
};

/// Opens an empty (idle) quiz session.
pub async fn create_session(
    State(sessions): State<Arc<SessionRegistry>>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = sessions.create().await;

    Ok((StatusCode::CREATED, Json(CreatedSession { session_id })))
}

pub async fn get_session(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.view(id).await?))
}

pub async fn delete_session(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    sessions.remove(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Generates a quiz from notes and loads it into the session.
///
/// The request is tagged with a ticket before the gateway call; if the session
/// is reset or another quiz is requested meanwhile, the result is discarded
/// with 409 and the session keeps its newer state. On any failure the session
/// is left unchanged.
pub async fn start_quiz(
    State(sessions): State<Arc<SessionRegistry>>,
    State(gateway): State<ModelGateway>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<StartQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let document = payload
        .document
        .as_deref()
        .map(document_key)
        .transpose()?;

    let ticket = sessions.issue(id).await?;
    let questions = gateway.generate_quiz(&payload.notes).await?;
    let view = sessions.install(ticket, questions, document).await?;

    tracing::info!(session_id = %id, total = view.total, "Quiz started");
    Ok(Json(view))
}

/// Discards the current quiz and any outstanding generation request.
pub async fn reset_quiz(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.reset(id).await?))
}

/// Records an answer for the current question. Ignored once completed.
pub async fn select_answer(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let key = payload.key().map_err(AppError::BadRequest)?;

    let view = sessions
        .with_slot(id, |slot| {
            slot.session.select_answer(key);
            slot.view(id)
        })
        .await?;

    Ok(Json(view))
}

/// Moves to the next question, completing the quiz on the last one.
///
/// Completing a quiz tied to a document marks the quiz's topics as covered
/// for that document. If that write fails the completion is rolled back, so
/// the client can retry `advance` from the last question.
pub async fn advance(
    State(sessions): State<Arc<SessionRegistry>>,
    State(coverage): State<Arc<CoverageTracker>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (view, completed) = sessions
        .with_slot(id, |slot| {
            let completed = match slot.session.advance() {
                Advance::Completed => slot
                    .document
                    .clone()
                    .map(|doc| (doc, slot.session.topics(), slot.ticket(id))),
                Advance::Moved | Advance::Ignored => None,
            };
            (slot.view(id), completed)
        })
        .await?;

    if let Some((document, topics, ticket)) = completed {
        if let Err(err) = coverage.record_completed_topics(&document, &topics).await {
            let reopened = sessions.reopen(ticket).await.unwrap_or(false);
            tracing::warn!(session_id = %id, reopened, "Coverage update failed, quiz completion rolled back");
            return Err(err);
        }
    }
    if view.state == SessionState::Completed {
        tracing::debug!(session_id = %id, "Quiz completed");
    }

    Ok(Json(view))
}

pub async fn retreat(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions
        .with_slot(id, |slot| {
            slot.session.retreat();
            slot.view(id)
        })
        .await?;

    Ok(Json(view))
}

/// Scores a completed quiz locally.
pub async fn score(
    State(sessions): State<Arc<SessionRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sessions
        .with_slot(id, |slot| match slot.session.state() {
            SessionState::Completed => slot.session.score(),
            SessionState::Idle | SessionState::InProgress => None,
        })
        .await?
        .ok_or_else(|| AppError::Conflict("Quiz is not finished yet.".to_string()))?;

    Ok(Json(result))
}
