// src/gateway/prompts.rs

use std::collections::BTreeMap;

use serde_json::json;

use crate::{gateway::Prompt, models::question::QuizQuestion};

pub const TUTOR_PERSONA: &str = "You are a friendly, patient study assistant. \
Explain concepts clearly and concisely, use examples where they help, and format \
answers in Markdown. If a question is unrelated to studying, answer briefly and \
steer back to the material.";

const JSON_ONLY: &str = "Respond with JSON only. Do not wrap it in Markdown or add commentary.";

pub fn generate_quiz(notes: &str, question_count: usize) -> Prompt {
    let text = format!(
        "Create a multiple-choice quiz of exactly {count} questions based on the study notes below.\n\
         Each question must have exactly four options labelled \"A\", \"B\", \"C\" and \"D\", \
         exactly one correct answer, a short topic name, and a one or two sentence explanation.\n\
         Use this JSON shape:\n\
         {{\"questions\": [{{\"topic\": \"...\", \"question\": \"...\", \
         \"options\": {{\"A\": \"...\", \"B\": \"...\", \"C\": \"...\", \"D\": \"...\"}}, \
         \"correct_answer\": \"A\", \"explanation\": \"...\"}}]}}\n\
         Vary which letter is correct.\n\n\
         Notes:\n{notes}",
        count = question_count,
        notes = notes.trim(),
    );
    Prompt::json(text).with_system(JSON_ONLY)
}

pub fn summarize(text: &str) -> Prompt {
    let text = format!(
        "Summarize the following study material for a student revising for an exam. \
         Use Markdown with short headings and bullet points, keep every key definition, \
         and stay under 400 words.\n\nMaterial:\n{}",
        text.trim()
    );
    Prompt::text(text)
}

pub fn extract_topics(text: &str) -> Prompt {
    let text = format!(
        "List the distinct study topics covered by the material below, in the order they \
         appear. Use short names (one to five words) and no duplicates.\n\
         Use this JSON shape: {{\"topics\": [\"...\"]}}\n\nMaterial:\n{}",
        text.trim()
    );
    Prompt::json(text).with_system(JSON_ONLY)
}

pub fn score_quiz(questions: &[QuizQuestion], answers: &BTreeMap<usize, String>) -> Prompt {
    let items: Vec<_> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            json!({
                "index": i,
                "topic": q.topic(),
                "question": q.question(),
                "options": q.options(),
                "correct_answer": q.correct_answer(),
                "user_answer": answers.get(&i),
            })
        })
        .collect();

    let text = format!(
        "A student just finished this quiz. For every question, in order, say whether the \
         student's answer is correct and explain the right answer in one or two sentences, \
         addressing the student directly. A null user_answer means the question was skipped. \
         Then give an overall score and a short encouraging summary naming what to review.\n\
         Use this JSON shape:\n\
         {{\"feedback\": [{{\"question\": \"...\", \"userAnswer\": \"A\", \"correctAnswer\": \"B\", \
         \"isCorrect\": false, \"explanation\": \"...\"}}], \
         \"score\": {{\"correct\": 0, \"total\": 0, \"percentage\": 0, \"summary\": \"...\"}}}}\n\n\
         Quiz:\n{}",
        serde_json::Value::Array(items)
    );
    Prompt::json(text).with_system(JSON_ONLY)
}

pub fn chat(message: &str, system_instruction: Option<&str>) -> Prompt {
    let system = system_instruction
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(TUTOR_PERSONA);
    Prompt::text(message.trim()).with_system(system)
}
