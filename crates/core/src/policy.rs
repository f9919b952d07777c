use chrono::Duration;

/// Thresholds and caps for progress aggregation and recommendations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPolicy {
    /// Topics need at least this many attempts before they can be weak.
    pub weak_min_attempts: u32,
    /// Accuracy strictly below this marks a weak area.
    pub weak_accuracy_below: u32,
    /// Accuracy strictly below this makes the weak area high priority.
    pub high_priority_below: u32,
    pub max_weak_areas: usize,
    pub max_history: usize,
    /// Topics not practiced for this long are due for review.
    pub review_after: Duration,
    pub unpracticed_shown: usize,
    pub review_candidates: usize,
    pub review_shown: usize,
    pub goal_quizzes: u32,
    pub goal_accuracy: u32,
    /// Number of recent quizzes the report's trend looks at.
    pub recent_window: usize,
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            weak_min_attempts: 5,
            weak_accuracy_below: 70,
            high_priority_below: 50,
            max_weak_areas: 10,
            max_history: 50,
            review_after: Duration::days(7),
            unpracticed_shown: 3,
            review_candidates: 5,
            review_shown: 3,
            goal_quizzes: 5,
            goal_accuracy: 70,
            recent_window: 5,
        }
    }
}
