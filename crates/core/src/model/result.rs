use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::ids::TopicId;
use crate::model::progress::QuizHistoryEntry;
use crate::model::question::Question;

/// Correct/incorrect counts for one topic within a single quiz.
///
/// `correct + incorrect <= total`; equality once every question of the topic is answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTally {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
}

impl TopicTally {
    #[must_use]
    pub fn answered(&self) -> u32 {
        self.correct + self.incorrect
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.answered() == self.total
    }
}

/// Snapshot of a finished quiz, consumed once by the progress aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub topics: Vec<TopicId>,
    pub timestamp: DateTime<Utc>,
    pub time_spent: u64,
    pub user_answers: Vec<Option<u8>>,
    pub questions: Vec<Question>,
    pub topic_performance: IndexMap<TopicId, TopicTally>,
}

impl QuizResult {
    /// Exact `(attempted, correct)` per topic, pairing questions with answers by index.
    ///
    /// Unanswered questions count as attempted and not correct.
    #[must_use]
    pub fn topic_counts(&self) -> IndexMap<TopicId, (u32, u32)> {
        let mut counts: IndexMap<TopicId, (u32, u32)> = IndexMap::new();
        for (index, question) in self.questions.iter().enumerate() {
            let entry = counts.entry(question.topic().clone()).or_default();
            entry.0 += 1;
            let answer = self.user_answers.get(index).copied().flatten();
            if answer.is_some_and(|option| question.is_correct(option)) {
                entry.1 += 1;
            }
        }
        counts
    }

    #[must_use]
    pub fn history_entry(&self) -> QuizHistoryEntry {
        QuizHistoryEntry {
            timestamp: self.timestamp,
            score: self.score,
            correct_answers: self.correct_answers,
            total_questions: self.total_questions,
            topics: self.topics.clone(),
            time_spent: self.time_spent,
        }
    }
}
