use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TopicId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizConfigError {
    #[error("at least one topic must be selected")]
    NoTopics,

    #[error("question count must be > 0")]
    ZeroQuestions,
}

/// What a quiz should ask about and how many questions it should hold.
///
/// Topics are kept in selection order with duplicates dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawQuizConfig")]
pub struct QuizConfig {
    topics: Vec<TopicId>,
    question_count: usize,
}

impl QuizConfig {
    /// Build a config from selected topics.
    ///
    /// # Errors
    ///
    /// Returns `QuizConfigError` if no topic is selected or `question_count` is zero.
    pub fn new(
        topics: impl IntoIterator<Item = TopicId>,
        question_count: usize,
    ) -> Result<Self, QuizConfigError> {
        let mut unique: Vec<TopicId> = Vec::new();
        for topic in topics {
            if !unique.contains(&topic) {
                unique.push(topic);
            }
        }
        if unique.is_empty() {
            return Err(QuizConfigError::NoTopics);
        }
        if question_count == 0 {
            return Err(QuizConfigError::ZeroQuestions);
        }
        Ok(Self {
            topics: unique,
            question_count,
        })
    }

    #[must_use]
    pub fn topics(&self) -> &[TopicId] {
        &self.topics
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizConfig {
    topics: Vec<TopicId>,
    question_count: usize,
}

impl TryFrom<RawQuizConfig> for QuizConfig {
    type Error = QuizConfigError;

    fn try_from(raw: RawQuizConfig) -> Result<Self, Self::Error> {
        Self::new(raw.topics, raw.question_count)
    }
}
