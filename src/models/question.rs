// src/models/question.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four fixed answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChoiceKey {
    A,
    B,
    C,
    D,
}

impl ChoiceKey {
    pub const ALL: [ChoiceKey; 4] = [ChoiceKey::A, ChoiceKey::B, ChoiceKey::C, ChoiceKey::D];

    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceKey::A => "A",
            ChoiceKey::B => "B",
            ChoiceKey::C => "C",
            ChoiceKey::D => "D",
        }
    }
}

impl AsRef<str> for ChoiceKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceKey {
    type Err = String;

    /// Accepts `a`/`A` and surrounding whitespace; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ChoiceKey::A),
            "B" => Ok(ChoiceKey::B),
            "C" => Ok(ChoiceKey::C),
            "D" => Ok(ChoiceKey::D),
            _ => Err(format!("'{}' is not a valid choice (expected A, B, C or D)", s)),
        }
    }
}

impl TryFrom<String> for ChoiceKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChoiceKey> for String {
    fn from(key: ChoiceKey) -> Self {
        key.as_str().to_string()
    }
}

/// A multiple-choice question with its answer key.
///
/// Only obtainable through [`QuizQuestion::new`] or deserialization, both of which
/// validate the raw shape, so `correct_answer` is always one of the option keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuizQuestion")]
pub struct QuizQuestion {
    topic: String,
    question: String,
    options: BTreeMap<ChoiceKey, String>,
    correct_answer: ChoiceKey,
    explanation: String,
}

/// Wire shape of a question before validation.
#[derive(Debug, Deserialize)]
struct RawQuizQuestion {
    topic: String,
    question: String,
    options: BTreeMap<String, String>,
    correct_answer: String,
    #[serde(default)]
    explanation: String,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = String;

    fn try_from(raw: RawQuizQuestion) -> Result<Self, Self::Error> {
        let options = raw
            .options
            .into_iter()
            .map(|(key, text)| -> Result<(ChoiceKey, String), String> {
                Ok((key.parse()?, text))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let correct_answer = raw.correct_answer.parse::<ChoiceKey>()?;

        QuizQuestion::new(
            raw.topic,
            raw.question,
            options,
            correct_answer,
            raw.explanation,
        )
    }
}

impl QuizQuestion {
    pub fn new(
        topic: impl Into<String>,
        question: impl Into<String>,
        options: impl IntoIterator<Item = (ChoiceKey, String)>,
        correct_answer: ChoiceKey,
        explanation: impl Into<String>,
    ) -> Result<Self, String> {
        let topic = topic.into().trim().to_string();
        let question = question.into().trim().to_string();

        if topic.is_empty() {
            return Err("question topic is empty".to_string());
        }
        if question.is_empty() {
            return Err("question text is empty".to_string());
        }

        let mut map = BTreeMap::new();
        for (key, text) in options {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(format!("option {} is empty", key));
            }
            if map.insert(key, text).is_some() {
                return Err(format!("option {} appears more than once", key));
            }
        }
        if map.len() != ChoiceKey::ALL.len() {
            return Err(format!("expected 4 options (A-D), found {}", map.len()));
        }
        if !map.contains_key(&correct_answer) {
            return Err(format!("correct answer {} is not an option", correct_answer));
        }

        Ok(Self {
            topic,
            question,
            options: map,
            correct_answer,
            explanation: explanation.into().trim().to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &BTreeMap<ChoiceKey, String> {
        &self.options
    }

    pub fn correct_answer(&self) -> ChoiceKey {
        self.correct_answer
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// View safe to show while the quiz is still being answered.
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            topic: self.topic.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
        }
    }
}

/// DTO for sending a question to the client (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub topic: String,
    pub question: String,
    pub options: BTreeMap<ChoiceKey, String>,
}

#[cfg(test)]
pub(crate) fn sample_question(topic: &str, correct: ChoiceKey) -> QuizQuestion {
    QuizQuestion::new(
        topic,
        format!("Which statement about {} holds?", topic),
        ChoiceKey::ALL.map(|k| (k, format!("Option {}", k))),
        correct,
        format!("{} is the right one.", correct),
    )
    .expect("sample question is valid")
}
