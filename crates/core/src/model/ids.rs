use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a leaf topic in the study taxonomy, e.g. `upper-limb`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    /// Creates a new `TopicId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a single question, unique within a question bank.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for TopicId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicId({})", self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Subject ───────────────────────────────────────────────────────────────────

/// Top-level grouping of topics.
///
/// The derived ordering is the order subjects are listed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Anatomy,
    Physiology,
    Biochemistry,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Anatomy, Subject::Physiology, Subject::Biochemistry];

    /// Stable lowercase key, also used as the data directory name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Anatomy => "anatomy",
            Subject::Physiology => "physiology",
            Subject::Biochemistry => "biochemistry",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Anatomy => "Anatomy",
            Subject::Physiology => "Physiology",
            Subject::Biochemistry => "Biochemistry",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a `Subject` from string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown subject: {raw}")]
pub struct ParseSubjectError {
    raw: String,
}

impl FromStr for Subject {
    type Err = ParseSubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSubjectError { raw: s.to_string() })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_id_display_is_raw_value() {
        let id = TopicId::from("upper-limb");
        assert_eq!(id.to_string(), "upper-limb");
        assert_eq!(format!("{id:?}"), "TopicId(upper-limb)");
    }

    #[test]
    fn topic_id_serializes_transparently() {
        let json = serde_json::to_string(&TopicId::new("thorax")).unwrap();
        assert_eq!(json, "\"thorax\"");
    }

    #[test]
    fn subject_parses_case_insensitively() {
        assert_eq!("Anatomy".parse::<Subject>().unwrap(), Subject::Anatomy);
        assert_eq!(" biochemistry ".parse::<Subject>().unwrap(), Subject::Biochemistry);
        assert!("pharmacology".parse::<Subject>().is_err());
    }

    #[test]
    fn subject_serializes_lowercase() {
        let json = serde_json::to_string(&Subject::Physiology).unwrap();
        assert_eq!(json, "\"physiology\"");
    }
}
