mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{SessionPlan, plan_questions, shuffle};
pub use progress::{Score, SessionProgress};
pub use service::{AnswerSlot, QuizSession};
pub use workflow::{FinishedQuiz, QuizWorkflow};
