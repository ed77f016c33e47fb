// src/quiz/scoring.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::question::{ChoiceKey, QuizQuestion};

/// Outcome of one question within a scored attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub topic: String,
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: ChoiceKey,
    pub is_correct: bool,
    pub explanation: String,
}

/// Aggregate result of an attempt. A pure view, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub correct: usize,
    pub total: usize,
    /// Full precision; see [`ScoreResult::display_percentage`] for the rounded form.
    pub percentage: f64,
    pub per_question: Vec<QuestionResult>,
}

impl ScoreResult {
    /// Percentage rounded to one decimal place, for display only.
    pub fn display_percentage(&self) -> f64 {
        round_one_decimal(self.percentage)
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * correct as f64 / total as f64
}

/// Scores `answers` (question index -> chosen key) against the answer key.
///
/// Absent answers and answers that are not a valid choice key count as incorrect.
/// Answers for indices outside the question set are ignored.
pub fn score<A: AsRef<str>>(questions: &[QuizQuestion], answers: &BTreeMap<usize, A>) -> ScoreResult {
    let per_question: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let raw = answers.get(&i).map(|a| a.as_ref().trim());
            let key = raw.and_then(|a| a.parse::<ChoiceKey>().ok());
            let is_correct = key.is_some_and(|key| key == q.correct_answer());
            // Valid keys are reported normalized ("a" -> "A"); anything else as sent.
            let user_answer = match (key, raw) {
                (Some(key), _) => Some(key.to_string()),
                (None, raw) => raw.map(str::to_string),
            };

            QuestionResult {
                topic: q.topic().to_string(),
                question: q.question().to_string(),
                user_answer,
                correct_answer: q.correct_answer(),
                is_correct,
                explanation: q.explanation().to_string(),
            }
        })
        .collect();

    let correct = per_question.iter().filter(|r| r.is_correct).count();
    let total = questions.len();

    ScoreResult {
        correct,
        total,
        percentage: percentage(correct, total),
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::sample_question;

    fn three_questions() -> Vec<QuizQuestion> {
        vec![
            sample_question("Cells", ChoiceKey::A),
            sample_question("Genetics", ChoiceKey::B),
            sample_question("Ecology", ChoiceKey::C),
        ]
    }

    #[test]
    fn scores_partial_attempt() {
        let questions = three_questions();
        let mut answers = BTreeMap::new();
        answers.insert(0, "A".to_string());
        answers.insert(1, "X".to_string());

        let result = score(&questions, &answers);

        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 3);
        assert!((result.percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.display_percentage(), 33.3);
        assert!(!result.per_question[1].is_correct);
        assert_eq!(result.per_question[1].user_answer.as_deref(), Some("X"));
        assert_eq!(result.per_question[2].user_answer, None);
        assert!(!result.per_question[2].is_correct);
    }

    #[test]
    fn valid_answers_are_reported_normalized() {
        let questions = three_questions();
        let answers: BTreeMap<usize, &str> = [(0, " a "), (1, "x")].into();

        let result = score(&questions, &answers);

        assert_eq!(result.per_question[0].user_answer.as_deref(), Some("A"));
        assert!(result.per_question[0].is_correct);
        assert_eq!(result.per_question[1].user_answer.as_deref(), Some("x"));
    }

    #[test]
    fn perfect_and_zero_scores() {
        let questions = three_questions();
        let all_right: BTreeMap<usize, ChoiceKey> =
            [(0, ChoiceKey::A), (1, ChoiceKey::B), (2, ChoiceKey::C)].into();
        let all_wrong: BTreeMap<usize, ChoiceKey> =
            [(0, ChoiceKey::D), (1, ChoiceKey::D), (2, ChoiceKey::D)].into();

        assert_eq!(score(&questions, &all_right).percentage, 100.0);
        assert_eq!(score(&questions, &all_wrong).percentage, 0.0);
    }

    #[test]
    fn scoring_is_idempotent() {
        let questions = three_questions();
        let answers: BTreeMap<usize, &str> = [(0, "B"), (2, "C")].into();

        assert_eq!(score(&questions, &answers), score(&questions, &answers));
    }

    #[test]
    fn percentage_matches_ratio() {
        let questions: Vec<QuizQuestion> = (0..7)
            .map(|i| sample_question(&format!("T{}", i), ChoiceKey::A))
            .collect();
        for right in 0..=7usize {
            let answers: BTreeMap<usize, &str> = (0..right).map(|i| (i, "A")).collect();
            let result = score(&questions, &answers);
            assert_eq!(result.correct, right);
            assert!((result.percentage - 100.0 * right as f64 / 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn out_of_range_answers_are_ignored() {
        let questions = three_questions();
        let answers: BTreeMap<usize, &str> = [(0, "A"), (9, "A")].into();
        let result = score(&questions, &answers);
        assert_eq!(result.correct, 1);
        assert_eq!(result.per_question.len(), 3);
    }

    #[test]
    fn empty_question_set_scores_zero() {
        let answers: BTreeMap<usize, &str> = BTreeMap::new();
        let result = score(&[], &answers);
        assert_eq!(result.total, 0);
        assert_eq!(result.percentage, 0.0);
    }
}
