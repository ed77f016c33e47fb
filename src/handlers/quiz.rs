// src/handlers/quiz.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    extract::AppJson,
    gateway::ModelGateway,
    models::{
        feedback::FeedbackRequest,
        study::{GenerateQuizRequest, QuizResponse},
    },
    quiz::feedback::reconcile,
};

/// Generates a multiple-choice quiz from the submitted notes.
///
/// Every returned question has four options (A-D) and an answer key that is
/// one of them; model output that does not fit is rejected as malformed.
pub async fn generate_quiz(
    State(gateway): State<ModelGateway>,
    AppJson(payload): AppJson<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let questions = gateway.generate_quiz(&payload.notes).await?;

    Ok(Json(QuizResponse { questions }))
}

/// Grades a finished quiz and returns per-question feedback.
///
/// * The model writes explanations and the overall summary.
/// * Correctness and the score are recomputed locally from the answer key;
///   if the model disagrees, `scoreMismatch` is set and the local numbers win.
pub async fn quiz_feedback(
    State(gateway): State<ModelGateway>,
    AppJson(payload): AppJson<FeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let model = gateway
        .score_quiz(&payload.questions, &payload.user_answers)
        .await?;
    let feedback = reconcile(&payload.questions, &payload.user_answers, model);

    if feedback.score_mismatch {
        tracing::warn!(
            correct = feedback.score.correct,
            total = feedback.score.total,
            "Returning locally computed score after gateway mismatch"
        );
    }

    Ok(Json(feedback))
}
