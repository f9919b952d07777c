#![forbid(unsafe_code)]

pub mod error;
pub mod progress_service;
pub mod questions;
pub mod sessions;

pub use medquiz_core::Clock;
pub use sessions as session;

pub use error::{ProgressError, SessionError};
pub use progress_service::ProgressService;
pub use questions::{FileQuestionProvider, QuestionProvider, StaticQuestionProvider};

pub use sessions::{
    AnswerSlot, FinishedQuiz, QuizSession, QuizWorkflow, Score, SessionPlan, SessionProgress,
};
