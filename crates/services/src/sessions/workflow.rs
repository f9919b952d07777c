use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{info, warn};

use medquiz_core::Clock;
use medquiz_core::model::{QuizConfig, QuizResult, UserProgress};
use storage::repository::{Storage, StoreKey};

use super::plan::plan_questions;
use super::service::QuizSession;
use crate::error::SessionError;
use crate::progress_service::ProgressService;
use crate::questions::QuestionProvider;

/// Outcome of finishing a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedQuiz {
    pub result: QuizResult,
    pub progress: UserProgress,
}

/// Orchestrates quiz start and finish around the store.
#[derive(Clone)]
pub struct QuizWorkflow {
    clock: Clock,
    provider: Arc<dyn QuestionProvider>,
    storage: Storage,
    progress: ProgressService,
    rng: Arc<Mutex<StdRng>>,
}

impl QuizWorkflow {
    #[must_use]
    pub fn new(
        clock: Clock,
        provider: Arc<dyn QuestionProvider>,
        storage: Storage,
        progress: ProgressService,
    ) -> Self {
        Self {
            clock,
            provider,
            storage,
            progress,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Seed the shuffle for reproducible question order.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    /// Load, shuffle, and cap questions for `config`, then remember the config.
    ///
    /// Fewer available questions than requested is not an error; the session
    /// is simply shorter, possibly empty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the config cannot be saved.
    pub async fn start(&self, config: QuizConfig) -> Result<QuizSession, SessionError> {
        let started_at = self.clock.now();
        let loaded = self.provider.load(config.topics()).await;
        let plan = {
            let mut rng = self.rng.lock().await;
            plan_questions(loaded, config.question_count(), &mut *rng)
        };
        if plan.is_degraded() {
            warn!(
                requested = plan.requested,
                available = plan.available,
                "not enough questions for the requested quiz length"
            );
        }

        self.storage.save(StoreKey::QuizConfig, &config).await?;
        info!(
            topics = config.topics().len(),
            questions = plan.questions.len(),
            "quiz started"
        );
        Ok(QuizSession::new(config, plan.questions, started_at))
    }

    /// Compute results, store them as the latest quiz, and fold them into progress.
    ///
    /// The session is consumed, so each session reaches the aggregator once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` or `SessionError::Progress` when persisting
    /// fails. The latest results may be saved even if the progress commit fails.
    pub async fn finish(&self, session: QuizSession) -> Result<FinishedQuiz, SessionError> {
        let result = session.calculate_results(self.clock.now());
        self.storage.save(StoreKey::QuizResults, &result).await?;
        let progress = self.progress.commit(&result).await?;
        Ok(FinishedQuiz { result, progress })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use medquiz_core::Catalog;
    use medquiz_core::model::{Question, TopicId};
    use std::sync::Mutex as StdMutex;

    use crate::questions::sample_questions;

    /// Serves sample questions and remembers when it was asked.
    struct TimedProvider {
        loaded_at: StdMutex<Option<DateTime<Utc>>>,
    }

    #[async_trait]
    impl QuestionProvider for TimedProvider {
        async fn load(&self, topics: &[TopicId]) -> Vec<Question> {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            *self.loaded_at.lock().unwrap() = Some(Utc::now());
            let mut rng = StdRng::seed_from_u64(0);
            topics
                .iter()
                .flat_map(|topic| sample_questions(topic, 2, &mut rng))
                .collect()
        }
    }

    fn workflow(clock: Clock, provider: Arc<TimedProvider>) -> QuizWorkflow {
        let storage = Storage::in_memory();
        let progress = ProgressService::new(clock, storage.clone(), Arc::new(Catalog::medical()));
        QuizWorkflow::new(clock, provider, storage, progress).with_seed(11)
    }

    #[tokio::test]
    async fn start_time_is_taken_before_loading() {
        let provider = Arc::new(TimedProvider {
            loaded_at: StdMutex::new(None),
        });
        let flow = workflow(Clock::default(), Arc::clone(&provider));
        let config = QuizConfig::new([TopicId::new("thorax")], 2).unwrap();

        let session = flow.start(config).await.unwrap();
        let loaded_at = provider.loaded_at.lock().unwrap().expect("provider was called");
        assert!(session.started_at() < loaded_at);
    }

    #[tokio::test]
    async fn finishing_commits_the_session_once() {
        let provider = Arc::new(TimedProvider {
            loaded_at: StdMutex::new(None),
        });
        let flow = workflow(Clock::fixed(medquiz_core::time::fixed_now()), provider);
        let config = QuizConfig::new([TopicId::new("thorax")], 1).unwrap();

        let mut session = flow.start(config).await.unwrap();
        session.record_answer(0, 0).unwrap();
        let finished = flow.finish(session).await.unwrap();

        assert_eq!(finished.progress.total_quizzes(), 1);
        assert_eq!(finished.progress.total_questions_attempted(), 1);
        let stored = flow.progress().load().await.unwrap();
        assert_eq!(stored.total_quizzes(), 1);
    }
}
