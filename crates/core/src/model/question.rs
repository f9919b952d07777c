use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, TopicId};

/// Every question is four-option multiple choice.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("expected 4 options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("correct answer index {index} is out of range")]
    CorrectAnswerOutOfRange { index: u8 },

    #[error("question {id} has no topic")]
    MissingTopic { id: QuestionId },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

//
// ─── QUESTION DRAFT ────────────────────────────────────────────────────────────
//

/// Unvalidated question as it appears in a question bank file.
///
/// Bank files usually omit `topic`; loaders stamp it with [`QuestionDraft::with_topic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: u8,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicId>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    #[must_use]
    pub fn with_topic(mut self, topic: TopicId) -> Self {
        self.topic = Some(topic);
        self
    }

    /// Validate the draft into an immutable question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, the option count is not
    /// four, the correct answer does not index an option, or no topic is set.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let len = self.options.len();
        let options: [String; OPTION_COUNT] = self
            .options
            .try_into()
            .map_err(|_| QuestionError::WrongOptionCount { len })?;
        if usize::from(self.correct_answer) >= OPTION_COUNT {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: self.correct_answer,
            });
        }
        let Some(topic) = self.topic else {
            return Err(QuestionError::MissingTopic { id: self.id });
        };

        Ok(Question {
            id: self.id,
            question: self.question,
            options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            topic,
            difficulty: self.difficulty,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    id: QuestionId,
    question: String,
    options: [String; OPTION_COUNT],
    correct_answer: u8,
    explanation: String,
    topic: TopicId,
    difficulty: Difficulty,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> u8 {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn topic(&self) -> &TopicId {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Returns true when `option` is a valid index for this question.
    #[must_use]
    pub fn has_option(&self, option: u8) -> bool {
        usize::from(option) < self.options.len()
    }

    #[must_use]
    pub fn is_correct(&self, option: u8) -> bool {
        option == self.correct_answer
    }
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            question: question.question,
            options: question.options.into(),
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            topic: Some(question.topic),
            difficulty: question.difficulty,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
