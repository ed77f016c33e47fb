// src/quiz/feedback.rs

use std::collections::BTreeMap;

use tracing::warn;

use crate::{
    config::SCORE_TOLERANCE,
    models::{
        feedback::{FeedbackItem, FeedbackScore, ModelFeedback, QuizFeedback},
        question::{ChoiceKey, QuizQuestion},
    },
    quiz::scoring,
};

/// Combines model-written feedback with the locally computed score.
///
/// Correctness and the aggregate numbers always come from [`scoring::score`];
/// the model contributes explanation text and the summary. Any disagreement
/// is logged and reported through `score_mismatch`.
///
/// `model.feedback` holds exactly one item per question, in question order;
/// [`ModelGateway::score_quiz`](crate::gateway::ModelGateway::score_quiz)
/// rejects any other shape as malformed.
pub fn reconcile(
    questions: &[QuizQuestion],
    answers: &BTreeMap<usize, String>,
    model: ModelFeedback,
) -> QuizFeedback {
    let local = scoring::score(questions, answers);
    let mut mismatch = false;

    if model.score.correct != local.correct as u64
        || model.score.total != local.total as u64
        || (model.score.percentage - local.percentage).abs() > SCORE_TOLERANCE
    {
        warn!(
            model_correct = model.score.correct,
            model_total = model.score.total,
            model_percentage = model.score.percentage,
            local_correct = local.correct,
            local_total = local.total,
            local_percentage = local.percentage,
            "Gateway score disagrees with local score"
        );
        mismatch = true;
    }

    debug_assert_eq!(model.feedback.len(), local.per_question.len());
    let feedback = local
        .per_question
        .into_iter()
        .zip(model.feedback)
        .enumerate()
        .map(|(index, (result, item))| {
            let claimed_key = item
                .correct_answer
                .as_deref()
                .and_then(|k| k.parse::<ChoiceKey>().ok());
            if item.is_correct.is_some_and(|c| c != result.is_correct)
                || claimed_key.is_some_and(|k| k != result.correct_answer)
            {
                warn!(
                    index,
                    model_is_correct = ?item.is_correct,
                    model_correct_answer = ?item.correct_answer,
                    local_is_correct = result.is_correct,
                    local_correct_answer = %result.correct_answer,
                    "Gateway feedback disagrees with answer key"
                );
                mismatch = true;
            }

            let explanation = if item.explanation.trim().is_empty() {
                result.explanation
            } else {
                item.explanation.trim().to_string()
            };

            FeedbackItem {
                topic: result.topic,
                question: result.question,
                user_answer: result.user_answer,
                correct_answer: result.correct_answer,
                is_correct: result.is_correct,
                explanation,
            }
        })
        .collect();

    QuizFeedback {
        feedback,
        score: FeedbackScore {
            correct: local.correct,
            total: local.total,
            percentage: local.percentage,
            summary: model.score.summary.trim().to_string(),
        },
        score_mismatch: mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        feedback::{ModelFeedbackItem, ModelScore},
        question::sample_question,
    };

    fn questions() -> Vec<QuizQuestion> {
        vec![
            sample_question("Cells", ChoiceKey::A),
            sample_question("Genetics", ChoiceKey::B),
        ]
    }

    fn item(is_correct: bool, explanation: &str) -> ModelFeedbackItem {
        ModelFeedbackItem {
            is_correct: Some(is_correct),
            explanation: explanation.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn agreeing_model_output_is_not_flagged() {
        let answers: BTreeMap<usize, String> = [(0, "A".to_string()), (1, "C".to_string())].into();
        let model = ModelFeedback {
            feedback: vec![item(true, "Right."), item(false, "B was correct.")],
            score: ModelScore {
                correct: 1,
                total: 2,
                percentage: 50.0,
                summary: " Good start. ".to_string(),
            },
        };

        let result = reconcile(&questions(), &answers, model);

        assert!(!result.score_mismatch);
        assert_eq!(result.score.correct, 1);
        assert_eq!(result.score.summary, "Good start.");
        assert_eq!(result.feedback[1].explanation, "B was correct.");
    }

    #[test]
    fn inflated_model_score_is_flagged_and_overridden() {
        let answers: BTreeMap<usize, String> = [(0, "A".to_string())].into();
        let model = ModelFeedback {
            feedback: vec![item(true, ""), item(true, "")],
            score: ModelScore {
                correct: 2,
                total: 2,
                percentage: 100.0,
                summary: String::new(),
            },
        };

        let result = reconcile(&questions(), &answers, model);

        assert!(result.score_mismatch);
        assert_eq!(result.score.correct, 1);
        assert_eq!(result.score.percentage, 50.0);
        assert!(!result.feedback[1].is_correct);
        // Falls back to the question's own explanation.
        assert_eq!(result.feedback[1].explanation, "B is the right one.");
    }
}
