//! Advisory output derived from a [`UserProgress`] snapshot.
//!
//! Everything here is a pure function of its inputs; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Catalog, format_topic_name};
use crate::model::{Subject, TopicId, UserProgress, WeakArea};
use crate::policy::ProgressPolicy;

//
// ─── RECOMMENDATIONS ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    HighPriority,
    Unpracticed,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub topics: Vec<TopicId>,
}

/// Study recommendations in fixed order: high-priority weak areas, unpracticed
/// topics, then topics due for review. Empty categories are skipped.
#[must_use]
pub fn recommend(
    progress: &UserProgress,
    catalog: &Catalog,
    policy: &ProgressPolicy,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let high: Vec<TopicId> = progress
        .high_priority_areas()
        .map(|area| area.topic.clone())
        .collect();
    if !high.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::HighPriority,
            message: format!("Focus on {}", display_list(&high)),
            topics: high,
        });
    }

    let unpracticed: Vec<TopicId> = catalog
        .topics()
        .filter(|entry| !progress.topics().contains_key(&entry.id))
        .take(policy.unpracticed_shown)
        .map(|entry| entry.id.clone())
        .collect();
    if !unpracticed.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Unpracticed,
            message: format!("Try these new topics: {}", display_list(&unpracticed)),
            topics: unpracticed,
        });
    }

    let mut review = topics_due_for_review(progress, policy, now);
    review.truncate(policy.review_shown);
    if !review.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Review,
            message: format!("Review {}", display_list(&review)),
            topics: review,
        });
    }

    recommendations
}

/// Practiced topics never stamped or last active before `now - review_after`,
/// in topics map order, capped at `review_candidates`.
#[must_use]
pub fn topics_due_for_review(
    progress: &UserProgress,
    policy: &ProgressPolicy,
    now: DateTime<Utc>,
) -> Vec<TopicId> {
    let cutoff = now - policy.review_after;
    progress
        .topics()
        .iter()
        .filter(|(_, topic)| topic.last_active.is_none_or(|at| at < cutoff))
        .map(|(id, _)| id.clone())
        .take(policy.review_candidates)
        .collect()
}

fn display_list(topics: &[TopicId]) -> String {
    topics
        .iter()
        .map(|topic| format_topic_name(topic.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

//
// ─── GOALS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Consistency,
    Accuracy,
    WeakAreas,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyGoal {
    pub kind: GoalKind,
    pub target: u32,
    pub current: u32,
    pub message: String,
}

#[must_use]
pub fn study_goals(progress: &UserProgress, policy: &ProgressPolicy) -> Vec<StudyGoal> {
    let mut goals = Vec::new();

    if progress.total_quizzes() < policy.goal_quizzes {
        goals.push(StudyGoal {
            kind: GoalKind::Consistency,
            target: policy.goal_quizzes,
            current: progress.total_quizzes(),
            message: format!(
                "Complete {} quizzes to establish baseline",
                policy.goal_quizzes
            ),
        });
    }

    if progress.overall_accuracy() < policy.goal_accuracy {
        goals.push(StudyGoal {
            kind: GoalKind::Accuracy,
            target: policy.goal_accuracy,
            current: progress.overall_accuracy(),
            message: format!("Achieve {}% overall accuracy", policy.goal_accuracy),
        });
    }

    let high = progress.high_priority_areas().count();
    if high > 0 {
        goals.push(StudyGoal {
            kind: GoalKind::WeakAreas,
            target: 0,
            current: u32::try_from(high).unwrap_or(u32::MAX),
            message: "Address all high-priority weak areas".to_string(),
        });
    }

    goals
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub total_quizzes: u32,
    pub total_questions: u64,
    pub overall_accuracy: u32,
    pub weak_areas: Vec<WeakArea>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPerformance {
    pub quizzes: usize,
    pub average_score: u32,
    pub trend: Trend,
    pub best_subject: Option<Subject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub overall: OverallStats,
    pub recent: RecentPerformance,
    pub recommendations: Vec<Recommendation>,
    pub goals: Vec<StudyGoal>,
}

#[must_use]
pub fn progress_report(
    progress: &UserProgress,
    catalog: &Catalog,
    policy: &ProgressPolicy,
    now: DateTime<Utc>,
) -> ProgressReport {
    ProgressReport {
        overall: OverallStats {
            total_quizzes: progress.total_quizzes(),
            total_questions: progress.total_questions_attempted(),
            overall_accuracy: progress.overall_accuracy(),
            weak_areas: progress.weak_areas().to_vec(),
        },
        recent: recent_performance(progress, policy),
        recommendations: recommend(progress, catalog, policy, now),
        goals: study_goals(progress, policy),
    }
}

fn recent_performance(progress: &UserProgress, policy: &ProgressPolicy) -> RecentPerformance {
    let history = progress.quiz_history();
    let recent = &history[history.len().saturating_sub(policy.recent_window)..];

    let average_score = if recent.is_empty() {
        0
    } else {
        let sum: u64 = recent.iter().map(|entry| u64::from(entry.score)).sum();
        let len = recent.len() as u64;
        u32::try_from((sum * 2 + len) / (len * 2)).unwrap_or(u32::MAX)
    };

    let trend = match (recent.first(), recent.last()) {
        (Some(first), Some(last)) if recent.len() >= 2 => {
            if last.score > first.score {
                Trend::Improving
            } else if last.score < first.score {
                Trend::Declining
            } else {
                Trend::Stable
            }
        }
        _ => Trend::Stable,
    };

    let mut best_subject: Option<(Subject, u32)> = None;
    for (subject, stats) in progress.subjects() {
        if stats.attempted == 0 {
            continue;
        }
        if best_subject.is_none_or(|(_, accuracy)| stats.accuracy > accuracy) {
            best_subject = Some((*subject, stats.accuracy));
        }
    }

    RecentPerformance {
        quizzes: recent.len(),
        average_score,
        trend,
        best_subject: best_subject.map(|(subject, _)| subject),
    }
}
