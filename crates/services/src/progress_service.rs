use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use medquiz_core::aggregate;
use medquiz_core::model::{QuizConfig, QuizHistoryEntry, QuizResult, UserProgress};
use medquiz_core::recommend::{self, ProgressReport, Recommendation, StudyGoal};
use medquiz_core::{Catalog, Clock, ProgressPolicy};
use storage::repository::{Storage, StoreKey};

use crate::error::ProgressError;

/// Owns the persisted progress record and everything derived from it.
///
/// Commits are serialized through an internal lock so concurrent finishes
/// never lose an update.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    storage: Storage,
    catalog: Arc<Catalog>,
    policy: ProgressPolicy,
    commit_lock: Arc<Mutex<()>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, storage: Storage, catalog: Arc<Catalog>) -> Self {
        Self {
            clock,
            storage,
            catalog,
            policy: ProgressPolicy::default(),
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ProgressPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current progress, creating and persisting a blank record when none exists.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    pub async fn load(&self) -> Result<UserProgress, ProgressError> {
        if let Some(progress) = self.storage.load(StoreKey::UserProgress).await? {
            return Ok(progress);
        }
        let progress = UserProgress::new(self.clock.now());
        self.storage.save(StoreKey::UserProgress, &progress).await?;
        debug!("initialized empty progress record");
        Ok(progress)
    }

    /// Fold a finished quiz into the stored progress with a single write.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    /// Nothing is written when loading fails.
    pub async fn commit(&self, result: &QuizResult) -> Result<UserProgress, ProgressError> {
        let _guard = self.commit_lock.lock().await;

        let mut progress = self
            .storage
            .load(StoreKey::UserProgress)
            .await?
            .unwrap_or_else(|| UserProgress::new(self.clock.now()));
        let outcome = aggregate::commit(
            &mut progress,
            result,
            &self.catalog,
            &self.policy,
            self.clock.now(),
        );
        self.storage.save(StoreKey::UserProgress, &progress).await?;

        info!(
            version = outcome.version,
            score = result.score,
            questions = result.total_questions,
            subjects = ?outcome.subjects,
            "quiz committed"
        );
        Ok(progress)
    }

    /// Clear all quiz data and store a fresh progress record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if any key cannot be removed or written.
    pub async fn reset(&self) -> Result<UserProgress, ProgressError> {
        let _guard = self.commit_lock.lock().await;

        for key in StoreKey::ALL {
            self.storage.remove(key).await?;
        }
        let progress = UserProgress::new(self.clock.now());
        self.storage.save(StoreKey::UserProgress, &progress).await?;
        info!("progress reset");
        Ok(progress)
    }

    /// Recent quizzes, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    pub async fn history(&self) -> Result<Vec<QuizHistoryEntry>, ProgressError> {
        Ok(self.load().await?.quiz_history().to_vec())
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, ProgressError> {
        let progress = self.load().await?;
        Ok(recommend::recommend(
            &progress,
            &self.catalog,
            &self.policy,
            self.clock.now(),
        ))
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    pub async fn goals(&self) -> Result<Vec<StudyGoal>, ProgressError> {
        let progress = self.load().await?;
        Ok(recommend::study_goals(&progress, &self.policy))
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read or written.
    pub async fn report(&self) -> Result<ProgressReport, ProgressError> {
        let progress = self.load().await?;
        Ok(recommend::progress_report(
            &progress,
            &self.catalog,
            &self.policy,
            self.clock.now(),
        ))
    }

    /// The most recently finished quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read.
    pub async fn last_results(&self) -> Result<Option<QuizResult>, ProgressError> {
        Ok(self.storage.load(StoreKey::QuizResults).await?)
    }

    /// The configuration of the most recently started quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be read.
    pub async fn last_config(&self) -> Result<Option<QuizConfig>, ProgressError> {
        Ok(self.storage.load(StoreKey::QuizConfig).await?)
    }
}
