mod config;
mod ids;
mod progress;
mod question;
mod result;

pub use ids::{ParseSubjectError, QuestionId, Subject, TopicId};

pub use config::{QuizConfig, QuizConfigError};
pub use progress::{
    Priority, QuizHistoryEntry, TopicProgress, TopicStats, UserProgress, WeakArea, percentage,
};
pub use question::{Difficulty, OPTION_COUNT, Question, QuestionDraft, QuestionError};
pub use result::{QuizResult, TopicTally};
