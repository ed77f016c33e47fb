// src/models/study.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::{MAX_MESSAGE_CHARS, MAX_TEXT_CHARS},
    models::question::QuizQuestion,
};

/// DTO for `/api/generate-quiz`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = notes_present))]
    pub notes: String,
}

/// DTO for `/api/summary` and `/api/list-topics`.
#[derive(Debug, Deserialize, Validate)]
pub struct TextRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = text_present))]
    pub text: String,
}

/// DTO for `/api/chatbot`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = message_present))]
    pub message: String,

    /// Replaces the default tutor persona when present and non-blank.
    #[validate(length(max = 4000))]
    pub system_instruction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub(crate) fn notes_present(notes: &str) -> Result<(), validator::ValidationError> {
    super::require_text(notes, "Notes content is required.")?;
    super::limit_text(notes, MAX_TEXT_CHARS, "Notes content is too long.")
}

fn text_present(text: &str) -> Result<(), validator::ValidationError> {
    super::require_text(text, "Text content is required.")?;
    super::limit_text(text, MAX_TEXT_CHARS, "Text content is too long.")
}

fn message_present(message: &str) -> Result<(), validator::ValidationError> {
    super::require_text(message, "Message is required.")?;
    super::limit_text(message, MAX_MESSAGE_CHARS, "Message is too long.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn message_of(err: validator::ValidationErrors) -> String {
        match AppError::from(err) {
            AppError::BadRequest(msg) => msg,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn blank_notes_are_rejected_with_message() {
        let req = GenerateQuizRequest { notes: "   \n".to_string() };
        assert_eq!(message_of(req.validate().unwrap_err()), "Notes content is required.");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: TextRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(message_of(req.validate().unwrap_err()), "Text content is required.");
    }

    #[test]
    fn oversized_text_is_rejected() {
        let req = TextRequest { text: "x".repeat(MAX_TEXT_CHARS + 1) };
        assert_eq!(message_of(req.validate().unwrap_err()), "Text content is too long.");
    }

    #[test]
    fn chat_accepts_camel_case_instruction() {
        let req: ChatRequest = serde_json::from_value(serde_json::json!({
            "message": "Explain osmosis",
            "systemInstruction": "Answer like a pirate."
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.system_instruction.as_deref(), Some("Answer like a pirate."));
    }
}
