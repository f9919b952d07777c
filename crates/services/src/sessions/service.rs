use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;

use medquiz_core::model::{
    Question, QuizConfig, QuizResult, TopicId, TopicTally, percentage,
};
use medquiz_core::time::elapsed_secs;

use super::progress::{Score, SessionProgress};
use crate::error::SessionError;

//
// ─── ANSWER SLOT ───────────────────────────────────────────────────────────────
//

/// Answer state of one question: `Unanswered → Answered(a) → Answered(b)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerSlot {
    #[default]
    Unanswered,
    Answered(u8),
}

impl AnswerSlot {
    #[must_use]
    pub fn option(self) -> Option<u8> {
        match self {
            AnswerSlot::Unanswered => None,
            AnswerSlot::Answered(option) => Some(option),
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(self, AnswerSlot::Answered(_))
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt: ordered questions, a read cursor, answers, and per-topic tallies.
///
/// Answers may be given in any order and overwritten; the tallies always
/// reflect the latest answer for each question.
pub struct QuizSession {
    config: QuizConfig,
    questions: Vec<Question>,
    current: usize,
    answers: Vec<AnswerSlot>,
    started_at: DateTime<Utc>,
    tally: IndexMap<TopicId, TopicTally>,
}

impl QuizSession {
    /// Start a session over already planned questions.
    ///
    /// Extra questions beyond `config.question_count()` are dropped. An empty
    /// question list gives an empty session rather than an error.
    #[must_use]
    pub fn new(config: QuizConfig, mut questions: Vec<Question>, started_at: DateTime<Utc>) -> Self {
        questions.truncate(config.question_count());

        let mut tally: IndexMap<TopicId, TopicTally> = IndexMap::new();
        for question in &questions {
            tally.entry(question.topic().clone()).or_default().total += 1;
        }

        Self {
            config,
            answers: vec![AnswerSlot::Unanswered; questions.len()],
            questions,
            current: 0,
            started_at,
            tally,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<AnswerSlot> {
        self.answers.get(index).copied()
    }

    #[must_use]
    pub fn topic_tally(&self) -> &IndexMap<TopicId, TopicTally> {
        &self.tally
    }

    /// Record `option` for the question at `index` and report whether it is correct.
    ///
    /// Re-answering first withdraws the previous answer from the topic tally.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QuestionOutOfRange` or `SessionError::OptionOutOfRange`
    /// for indexes outside the session; the session is left unchanged.
    pub fn record_answer(&mut self, index: usize, option: u8) -> Result<bool, SessionError> {
        let Some(question) = self.questions.get(index) else {
            return Err(SessionError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            });
        };
        if !question.has_option(option) {
            return Err(SessionError::OptionOutOfRange { index, option });
        }

        let tally = self.tally.entry(question.topic().clone()).or_default();
        let previous = std::mem::replace(&mut self.answers[index], AnswerSlot::Answered(option));
        if let AnswerSlot::Answered(old) = previous {
            if question.is_correct(old) {
                tally.correct = tally.correct.saturating_sub(1);
            } else {
                tally.incorrect = tally.incorrect.saturating_sub(1);
            }
        }

        let is_correct = question.is_correct(option);
        if is_correct {
            tally.correct += 1;
        } else {
            tally.incorrect += 1;
        }
        Ok(is_correct)
    }

    /// Advance the cursor. Returns false at the last question.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor back. Returns false at the first question.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self.answers.iter().filter(|slot| slot.is_answered()).count();
        SessionProgress {
            current: self.current + 1,
            total: self.questions.len(),
            answered,
            percentage: percentage(answered as u64, self.questions.len() as u64),
        }
    }

    #[must_use]
    pub fn score(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, slot)| slot.option().is_some_and(|o| question.is_correct(o)))
            .count();
        Score {
            correct,
            total: self.questions.len(),
            percentage: percentage(correct as u64, self.questions.len() as u64),
        }
    }

    /// True when no question is left unanswered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(|slot| slot.is_answered())
    }

    /// 1-based positions of unanswered questions.
    #[must_use]
    pub fn unanswered(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_answered())
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// Distinct topics in order of first appearance.
    #[must_use]
    pub fn topics(&self) -> Vec<TopicId> {
        self.tally.keys().cloned().collect()
    }

    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        elapsed_secs(self.started_at, now)
    }

    /// Snapshot the session as a result stamped at `now`.
    #[must_use]
    pub fn calculate_results(&self, now: DateTime<Utc>) -> QuizResult {
        let score = self.score();
        QuizResult {
            score: score.percentage,
            correct_answers: u32::try_from(score.correct).unwrap_or(u32::MAX),
            total_questions: u32::try_from(score.total).unwrap_or(u32::MAX),
            topics: self.topics(),
            timestamp: now,
            time_spent: self.elapsed_secs(now),
            user_answers: self.answers.iter().map(|slot| slot.option()).collect(),
            questions: self.questions.clone(),
            topic_performance: self.tally.clone(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("topics", &self.config.topics())
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
