// src/quiz/session.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    error::AppError,
    models::question::{ChoiceKey, QuizQuestion},
    quiz::scoring::{self, ScoreResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    InProgress,
    Completed,
}

/// Result of [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question.
    Moved,
    /// Was on the last question; the attempt is now complete.
    Completed,
    /// Nothing to do (idle or already completed).
    Ignored,
}

#[derive(Debug, Clone)]
struct Attempt {
    questions: Vec<QuizQuestion>,
    selected: BTreeMap<usize, ChoiceKey>,
    current_index: usize,
    completed: bool,
}

/// Lifecycle of a single quiz attempt: `Idle -> InProgress -> Completed`.
///
/// Completed is terminal until [`QuizSession::reset`] or a new
/// [`QuizSession::start`]; every mutation after completion is a no-op.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    attempt: Option<Attempt>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match &self.attempt {
            None => SessionState::Idle,
            Some(a) if a.completed => SessionState::Completed,
            Some(_) => SessionState::InProgress,
        }
    }

    /// Loads a question set and moves to the first question.
    /// Any previous attempt is discarded.
    pub fn start(&mut self, questions: Vec<QuizQuestion>) -> Result<(), AppError> {
        if questions.is_empty() {
            return Err(AppError::BadRequest(
                "A quiz needs at least one question.".to_string(),
            ));
        }
        self.attempt = Some(Attempt {
            questions,
            selected: BTreeMap::new(),
            current_index: 0,
            completed: false,
        });
        Ok(())
    }

    /// Records `key` for the current question, replacing any earlier choice.
    /// Returns false when ignored (idle or completed).
    pub fn select_answer(&mut self, key: ChoiceKey) -> bool {
        match self.attempt.as_mut() {
            Some(a) if !a.completed => {
                a.selected.insert(a.current_index, key);
                true
            }
            _ => false,
        }
    }

    /// Moves forward; on the last question this completes the attempt.
    /// Unanswered questions do not block progress.
    pub fn advance(&mut self) -> Advance {
        match self.attempt.as_mut() {
            Some(a) if !a.completed => {
                if a.current_index + 1 >= a.questions.len() {
                    a.completed = true;
                    Advance::Completed
                } else {
                    a.current_index += 1;
                    Advance::Moved
                }
            }
            _ => Advance::Ignored,
        }
    }

    /// Moves back one question. Returns false at index 0, when idle, or once completed.
    pub fn retreat(&mut self) -> bool {
        match self.attempt.as_mut() {
            Some(a) if !a.completed && a.current_index > 0 => {
                a.current_index -= 1;
                true
            }
            _ => false,
        }
    }

    /// Reverts a completion, leaving the cursor on the last question with every
    /// answer intact. Returns false unless the attempt was completed.
    pub fn reopen(&mut self) -> bool {
        match self.attempt.as_mut() {
            Some(a) if a.completed => {
                a.completed = false;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.attempt = None;
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        self.attempt
            .as_ref()
            .map(|a| a.questions.as_slice())
            .unwrap_or(&[])
    }

    pub fn current_index(&self) -> usize {
        self.attempt.as_ref().map(|a| a.current_index).unwrap_or(0)
    }

    pub fn selected_answers(&self) -> BTreeMap<usize, ChoiceKey> {
        self.attempt
            .as_ref()
            .map(|a| a.selected.clone())
            .unwrap_or_default()
    }

    /// Whether the current question has a recorded answer. Clients that gate
    /// their "next" control on an answer use this; the session itself does not.
    pub fn current_answered(&self) -> bool {
        self.attempt
            .as_ref()
            .is_some_and(|a| a.selected.contains_key(&a.current_index))
    }

    /// Distinct topics of the loaded questions, in question order.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for q in self.questions() {
            if !topics.iter().any(|t| t == q.topic()) {
                topics.push(q.topic().to_string());
            }
        }
        topics
    }

    /// Scores the attempt as it stands. `None` when idle.
    pub fn score(&self) -> Option<ScoreResult> {
        self.attempt
            .as_ref()
            .map(|a| scoring::score(&a.questions, &a.selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::sample_question;

    fn two_questions() -> Vec<QuizQuestion> {
        vec![
            sample_question("Cells", ChoiceKey::A),
            sample_question("Genetics", ChoiceKey::B),
        ]
    }

    #[test]
    fn starts_idle() {
        let session = QuizSession::new();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.questions().is_empty());
        assert!(session.score().is_none());
    }

    #[test]
    fn start_rejects_empty_question_set() {
        let mut session = QuizSession::new();
        assert!(session.start(Vec::new()).is_err());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn advancing_past_last_question_completes() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.current_index(), 0);

        assert_eq!(session.advance(), Advance::Moved);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.state(), SessionState::InProgress);

        assert_eq!(session.advance(), Advance::Completed);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn navigation_after_completion_is_a_no_op() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        session.advance();
        session.advance();
        let index = session.current_index();

        assert_eq!(session.advance(), Advance::Ignored);
        assert!(!session.retreat());
        assert!(!session.select_answer(ChoiceKey::C));
        assert_eq!(session.current_index(), index);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.questions().len(), 2);
        assert!(session.selected_answers().is_empty());
    }

    #[test]
    fn reselection_overwrites_current_answer() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        assert!(!session.current_answered());

        session.select_answer(ChoiceKey::C);
        session.select_answer(ChoiceKey::A);

        assert!(session.current_answered());
        assert_eq!(session.selected_answers().get(&0), Some(&ChoiceKey::A));
        assert_eq!(session.selected_answers().len(), 1);
    }

    #[test]
    fn retreat_stops_at_first_question() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        assert!(!session.retreat());
        session.advance();
        assert!(session.retreat());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn answers_follow_the_cursor() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        session.select_answer(ChoiceKey::A);
        session.advance();
        session.select_answer(ChoiceKey::D);
        session.retreat();
        assert_eq!(session.selected_answers().get(&0), Some(&ChoiceKey::A));
        assert_eq!(session.selected_answers().get(&1), Some(&ChoiceKey::D));
    }

    #[test]
    fn unanswered_questions_still_complete_and_score_incorrect() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        session.select_answer(ChoiceKey::A);
        session.advance();
        session.advance();

        let result = session.score().unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.per_question[1].user_answer, None);
    }

    #[test]
    fn reopen_returns_to_last_question() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        session.advance();
        session.select_answer(ChoiceKey::B);
        assert!(!session.reopen());

        session.advance();
        assert!(session.reopen());
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.selected_answers().get(&1), Some(&ChoiceKey::B));
        assert_eq!(session.advance(), Advance::Completed);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = QuizSession::new();
        session.start(two_questions()).unwrap();
        session.select_answer(ChoiceKey::B);
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.selected_answers().is_empty());
        assert_eq!(session.advance(), Advance::Ignored);
    }

    #[test]
    fn topics_are_distinct_and_ordered() {
        let mut session = QuizSession::new();
        session
            .start(vec![
                sample_question("Cells", ChoiceKey::A),
                sample_question("Genetics", ChoiceKey::B),
                sample_question("Cells", ChoiceKey::C),
            ])
            .unwrap();
        assert_eq!(session.topics(), vec!["Cells", "Genetics"]);
    }
}
