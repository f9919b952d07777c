use serde::Serialize;

/// Position and completion of a session, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    /// 1-based cursor position.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub percentage: u32,
}

/// Correct answers so far out of the session size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}
