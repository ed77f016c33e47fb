// src/models/session.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::question::{ChoiceKey, PublicQuestion, QuizQuestion},
    quiz::session::{QuizSession, SessionState},
};

/// Questions as exposed by a session view: the answer key is only revealed
/// once the attempt is complete.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SessionQuestions {
    Hidden(Vec<PublicQuestion>),
    Revealed(Vec<QuizQuestion>),
}

/// Snapshot of a quiz session returned by every session endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    pub current_index: usize,
    pub total: usize,
    pub current_answered: bool,
    pub selected_answers: BTreeMap<usize, ChoiceKey>,
    pub questions: SessionQuestions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SessionView {
    pub fn new(
        session_id: Uuid,
        session: &QuizSession,
        document: Option<&str>,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let questions = match session.state() {
            SessionState::Completed => SessionQuestions::Revealed(session.questions().to_vec()),
            _ => SessionQuestions::Hidden(
                session.questions().iter().map(QuizQuestion::to_public).collect(),
            ),
        };

        Self {
            session_id,
            state: session.state(),
            current_index: session.current_index(),
            total: session.questions().len(),
            current_answered: session.current_answered(),
            selected_answers: session.selected_answers(),
            questions,
            document: document.map(str::to_string),
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: Uuid,
}

/// DTO for loading a generated quiz into a session.
#[derive(Debug, Deserialize, Validate)]
pub struct StartQuizRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = notes_present))]
    pub notes: String,

    /// Study document whose topic coverage is updated when the quiz completes.
    #[validate(length(max = 200))]
    pub document: Option<String>,
}

/// DTO for answering the current question.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = choice_present))]
    pub choice: String,
}

impl SelectAnswerRequest {
    pub fn key(&self) -> Result<ChoiceKey, String> {
        self.choice.parse()
    }
}

fn notes_present(notes: &str) -> Result<(), validator::ValidationError> {
    super::study::notes_present(notes)
}

fn choice_present(choice: &str) -> Result<(), validator::ValidationError> {
    super::require_text(choice, "Choice is required.")
}
