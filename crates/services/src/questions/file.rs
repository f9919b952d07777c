use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, warn};

use medquiz_core::Catalog;
use medquiz_core::model::{Question, QuestionDraft, TopicId};

use super::{QuestionProvider, sample_questions};

const DEFAULT_FALLBACK_PER_TOPIC: usize = 10;

/// Why a question bank could not be used.
#[derive(Debug, Error)]
enum BankError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid bank: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads `<data_dir>/<subject>/<topic>.json` question banks.
///
/// Topics the catalog cannot classify are skipped. A bank that cannot be read
/// or parsed is replaced by sample questions.
pub struct FileQuestionProvider {
    data_dir: PathBuf,
    catalog: Arc<Catalog>,
    fallback_per_topic: usize,
    rng: Mutex<StdRng>,
}

impl FileQuestionProvider {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, catalog: Arc<Catalog>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog,
            fallback_per_topic: DEFAULT_FALLBACK_PER_TOPIC,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    #[must_use]
    pub fn with_fallback_per_topic(mut self, count: usize) -> Self {
        self.fallback_per_topic = count;
        self
    }

    /// Seed the generator behind fallback difficulty labels.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    fn fallback(&self, topic: &TopicId) -> Vec<Question> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        sample_questions(topic, self.fallback_per_topic, &mut *rng)
    }

    async fn read_bank(path: &Path, topic: &TopicId) -> Result<Vec<Question>, BankError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let drafts: Vec<QuestionDraft> = serde_json::from_str(&raw)?;

        let mut questions = Vec::with_capacity(drafts.len());
        for draft in drafts {
            match draft.with_topic(topic.clone()).validate() {
                Ok(question) => questions.push(question),
                Err(err) => warn!(%topic, error = %err, "skipping invalid question"),
            }
        }
        Ok(questions)
    }
}

#[async_trait]
impl QuestionProvider for FileQuestionProvider {
    async fn load(&self, topics: &[TopicId]) -> Vec<Question> {
        let mut all = Vec::new();
        for topic in topics {
            let Some(subject) = self.catalog.subject_of(topic.as_str()) else {
                warn!(%topic, "could not determine subject for topic");
                continue;
            };
            let path = self
                .data_dir
                .join(subject.as_str())
                .join(format!("{topic}.json"));

            match Self::read_bank(&path, topic).await {
                Ok(questions) => {
                    debug!(%topic, count = questions.len(), "loaded question bank");
                    all.extend(questions);
                }
                Err(error) => {
                    warn!(%topic, path = %path.display(), %error, "using sample questions");
                    all.extend(self.fallback(topic));
                }
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BANK: &str = r#"[
        {"id": "ul-1", "question": "Q1?", "options": ["a","b","c","d"], "correctAnswer": 1, "difficulty": "easy"},
        {"id": "ul-2", "question": "Q2?", "options": ["a","b","c","d"], "correctAnswer": 2},
        {"id": "ul-bad", "question": "Bad?", "options": ["a","b"], "correctAnswer": 0}
    ]"#;

    fn provider(dir: &Path) -> FileQuestionProvider {
        FileQuestionProvider::new(dir, Arc::new(Catalog::medical()))
            .with_fallback_per_topic(4)
            .with_seed(1)
    }

    #[tokio::test]
    async fn reads_bank_and_stamps_topic() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("anatomy")).unwrap();
        fs::write(dir.path().join("anatomy/upper-limb.json"), BANK).unwrap();

        let questions = provider(dir.path()).load(&[TopicId::new("upper-limb")]).await;

        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.topic().as_str() == "upper-limb"));
        assert_eq!(questions[0].correct_answer(), 1);
    }

    #[tokio::test]
    async fn missing_bank_falls_back_to_samples() {
        let dir = tempfile::tempdir().unwrap();
        let questions = provider(dir.path()).load(&[TopicId::new("renal")]).await;

        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0].id().as_str(), "renal-1");
    }

    #[tokio::test]
    async fn malformed_bank_falls_back_to_samples() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("biochemistry")).unwrap();
        fs::write(dir.path().join("biochemistry/lab-values.json"), "{not json").unwrap();

        let questions = provider(dir.path()).load(&[TopicId::new("lab-values")]).await;
        assert_eq!(questions.len(), 4);
    }

    #[tokio::test]
    async fn unknown_topic_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let questions = provider(dir.path())
            .load(&[TopicId::new("astrology"), TopicId::new("thorax")])
            .await;

        assert_eq!(questions.len(), 4);
        assert!(questions.iter().all(|q| q.topic().as_str() == "thorax"));
    }

    #[tokio::test]
    async fn bank_errors_distinguish_missing_from_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let topic = TopicId::new("thorax");
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            FileQuestionProvider::read_bank(&missing, &topic).await,
            Err(BankError::Io(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "[{").unwrap();
        assert!(matches!(
            FileQuestionProvider::read_bank(&broken, &topic).await,
            Err(BankError::Parse(_))
        ));
    }
}
