//! Folds finished quizzes into cumulative [`UserProgress`].

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::model::{
    Priority, QuizResult, Subject, TopicId, TopicProgress, UserProgress, WeakArea, percentage,
};
use crate::policy::ProgressPolicy;

/// What a commit did beyond mutating the progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub version: u64,
    /// Subjects whose attempted tally grew, in quiz topic order.
    pub subjects: Vec<Subject>,
    /// Topics the catalog could not classify; they skip subject stats.
    pub unresolved: Vec<TopicId>,
}

/// Apply one finished quiz to `progress`.
///
/// Every touched subject receives the whole quiz's question and correct counts,
/// once per quiz. Topics receive their exact per-question counts.
pub fn commit(
    progress: &mut UserProgress,
    result: &QuizResult,
    catalog: &Catalog,
    policy: &ProgressPolicy,
    committed_at: DateTime<Utc>,
) -> CommitOutcome {
    let mut subjects: Vec<Subject> = Vec::new();
    let mut unresolved: Vec<TopicId> = Vec::new();
    for topic in &result.topics {
        match catalog.subject_of(topic.as_str()) {
            Some(subject) if !subjects.contains(&subject) => subjects.push(subject),
            Some(_) => {}
            None => {
                warn!(topic = %topic, "unknown topic, excluded from subject stats");
                unresolved.push(topic.clone());
            }
        }
    }

    for subject in &subjects {
        progress
            .subjects
            .entry(*subject)
            .or_default()
            .record(result.total_questions, result.correct_answers);
    }

    for (topic, (attempted, correct)) in result.topic_counts() {
        let entry = progress.topics.entry(topic).or_default();
        entry.stats.record(attempted, correct);
        entry.last_active = Some(committed_at);
    }

    progress.weak_areas = weak_areas(&progress.topics, policy);

    progress.total_quizzes = progress.total_quizzes.saturating_add(1);
    progress.total_questions_attempted = progress
        .total_questions_attempted
        .saturating_add(u64::from(result.total_questions));
    let (correct, attempted) = progress
        .subjects
        .values()
        .fold((0_u64, 0_u64), |(c, a), stats| {
            (c + u64::from(stats.correct), a + u64::from(stats.attempted))
        });
    progress.overall_accuracy = percentage(correct, attempted);
    progress.last_active = committed_at;

    progress.quiz_history.push(result.history_entry());
    if progress.quiz_history.len() > policy.max_history {
        let excess = progress.quiz_history.len() - policy.max_history;
        progress.quiz_history.drain(..excess);
    }

    progress.version += 1;
    debug!(
        version = progress.version,
        total_quizzes = progress.total_quizzes,
        overall_accuracy = progress.overall_accuracy,
        weak_areas = progress.weak_areas.len(),
        "quiz committed to progress"
    );

    CommitOutcome {
        version: progress.version,
        subjects,
        unresolved,
    }
}

/// Rank topics needing remediation: high priority first, then ascending accuracy.
///
/// Ties keep the topics map order.
#[must_use]
pub fn weak_areas(
    topics: &IndexMap<TopicId, TopicProgress>,
    policy: &ProgressPolicy,
) -> Vec<WeakArea> {
    let mut areas: Vec<WeakArea> = topics
        .iter()
        .filter(|(_, progress)| {
            progress.stats.attempted >= policy.weak_min_attempts
                && progress.stats.accuracy < policy.weak_accuracy_below
        })
        .map(|(topic, progress)| WeakArea {
            topic: topic.clone(),
            accuracy: progress.stats.accuracy,
            priority: if progress.stats.accuracy < policy.high_priority_below {
                Priority::High
            } else {
                Priority::Medium
            },
            last_practiced: progress.last_active,
        })
        .collect();
    areas.sort_by_key(|area| (area.priority, area.accuracy));
    areas.truncate(policy.max_weak_areas);
    areas
}
