use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::ids::{Subject, TopicId};

//
// ─── PERCENTAGES ───────────────────────────────────────────────────────────────
//

/// Integer percentage of `part` in `whole`, rounded half up.
///
/// Returns 0 when `whole` is zero so "no attempts yet" never produces NaN.
#[must_use]
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let scaled = (part.saturating_mul(200).saturating_add(whole)) / whole.saturating_mul(2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Running attempt and accuracy counters for a subject or topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStats {
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: u32,
}

impl TopicStats {
    /// Fold another batch of attempts in and recompute accuracy.
    pub fn record(&mut self, attempted: u32, correct: u32) {
        self.attempted = self.attempted.saturating_add(attempted);
        self.correct = self.correct.saturating_add(correct);
        self.accuracy = percentage(u64::from(self.correct), u64::from(self.attempted));
    }
}

/// Per-topic stats plus when the topic was last practiced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    #[serde(flatten)]
    pub stats: TopicStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

//
// ─── WEAK AREAS ────────────────────────────────────────────────────────────────
//

/// Remediation priority. `High` sorts before `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakArea {
    pub topic: TopicId,
    pub accuracy: u32,
    pub priority: Priority,
    #[serde(default)]
    pub last_practiced: Option<DateTime<Utc>>,
}

//
// ─── HISTORY ───────────────────────────────────────────────────────────────────
//

/// Compact record of one finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub topics: Vec<TopicId>,
    pub time_spent: u64,
}

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Cumulative study progress across every committed quiz.
///
/// Only `aggregate::commit` mutates a progress record; each commit bumps `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(default)]
    pub(crate) version: u64,
    pub(crate) subjects: BTreeMap<Subject, TopicStats>,
    pub(crate) topics: IndexMap<TopicId, TopicProgress>,
    pub(crate) weak_areas: Vec<WeakArea>,
    pub(crate) quiz_history: Vec<QuizHistoryEntry>,
    pub(crate) total_quizzes: u32,
    pub(crate) total_questions_attempted: u64,
    pub(crate) overall_accuracy: u32,
    pub(crate) last_active: DateTime<Utc>,
}

impl UserProgress {
    /// Fresh progress with every subject present at zero.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: 0,
            subjects: Subject::ALL
                .into_iter()
                .map(|subject| (subject, TopicStats::default()))
                .collect(),
            topics: IndexMap::new(),
            weak_areas: Vec::new(),
            quiz_history: Vec::new(),
            total_quizzes: 0,
            total_questions_attempted: 0,
            overall_accuracy: 0,
            last_active: now,
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn subjects(&self) -> &BTreeMap<Subject, TopicStats> {
        &self.subjects
    }

    #[must_use]
    pub fn subject(&self, subject: Subject) -> Option<&TopicStats> {
        self.subjects.get(&subject)
    }

    /// Per-topic progress in first-practiced order.
    #[must_use]
    pub fn topics(&self) -> &IndexMap<TopicId, TopicProgress> {
        &self.topics
    }

    #[must_use]
    pub fn topic(&self, topic: &str) -> Option<&TopicProgress> {
        self.topics.get(topic)
    }

    #[must_use]
    pub fn weak_areas(&self) -> &[WeakArea] {
        &self.weak_areas
    }

    /// Oldest first.
    #[must_use]
    pub fn quiz_history(&self) -> &[QuizHistoryEntry] {
        &self.quiz_history
    }

    #[must_use]
    pub fn total_quizzes(&self) -> u32 {
        self.total_quizzes
    }

    #[must_use]
    pub fn total_questions_attempted(&self) -> u64 {
        self.total_questions_attempted
    }

    #[must_use]
    pub fn overall_accuracy(&self) -> u32 {
        self.overall_accuracy
    }

    #[must_use]
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub fn high_priority_areas(&self) -> impl Iterator<Item = &WeakArea> {
        self.weak_areas
            .iter()
            .filter(|area| area.priority == Priority::High)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
