//! Question sources for quiz sessions.

mod file;
mod sample;

use async_trait::async_trait;

use medquiz_core::model::{Question, TopicId};

pub use file::FileQuestionProvider;
pub use sample::sample_questions;

/// Supplies questions for a set of topics.
///
/// Loading never fails as a whole: a provider that cannot read a topic
/// substitutes or skips it and returns whatever it has.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    async fn load(&self, topics: &[TopicId]) -> Vec<Question>;
}

/// Fixed in-memory question bank.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionProvider {
    questions: Vec<Question>,
}

impl StaticQuestionProvider {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

#[async_trait]
impl QuestionProvider for StaticQuestionProvider {
    /// Questions whose topic is selected, grouped by topic in selection order.
    async fn load(&self, topics: &[TopicId]) -> Vec<Question> {
        topics
            .iter()
            .flat_map(|topic| self.questions.iter().filter(move |q| q.topic() == topic))
            .cloned()
            .collect()
    }
}
