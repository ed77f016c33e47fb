// src/models/feedback.rs

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    config::MAX_FEEDBACK_QUESTIONS,
    models::question::{ChoiceKey, QuizQuestion},
};

/// DTO for `/api/quiz-feedback`.
///
/// `userAnswers` maps question index to the chosen key; indices without an
/// answer are simply absent.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = question_count))]
    pub questions: Vec<QuizQuestion>,

    #[serde(default)]
    pub user_answers: BTreeMap<usize, String>,
}

fn question_count(questions: &[QuizQuestion]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Questions are required.")));
    }
    if questions.len() > MAX_FEEDBACK_QUESTIONS {
        return Err(ValidationError::new("too_many")
            .with_message(Cow::Borrowed("Too many questions in one request.")));
    }
    Ok(())
}

/// Feedback as returned by the model, before it is checked against the
/// local score. Everything but the explanation text is advisory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFeedback {
    pub feedback: Vec<ModelFeedbackItem>,
    pub score: ModelScore,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFeedbackItem {
    #[serde(default)]
    pub question: String,
    #[serde(default, alias = "user_answer")]
    pub user_answer: Option<String>,
    #[serde(default, alias = "correct_answer")]
    pub correct_answer: Option<String>,
    #[serde(default, alias = "is_correct")]
    pub is_correct: Option<bool>,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelScore {
    pub correct: u64,
    pub total: u64,
    pub percentage: f64,
    #[serde(default)]
    pub summary: String,
}

/// One question of the feedback response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub topic: String,
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: ChoiceKey,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackScore {
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
    pub summary: String,
}

/// Response of `/api/quiz-feedback`. Numbers come from the local score;
/// `scoreMismatch` reports whether the model disagreed with them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizFeedback {
    pub feedback: Vec<FeedbackItem>,
    pub score: FeedbackScore,
    pub score_mismatch: bool,
}
