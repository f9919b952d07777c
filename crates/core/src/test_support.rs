use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::{QuestionDraft, QuestionId, Question, QuizResult, TopicId, TopicTally, percentage};

pub(crate) fn question(id: &str, topic: &str) -> Question {
    QuestionDraft {
        id: QuestionId::new(id),
        question: format!("Question {id}?"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: 0,
        explanation: String::new(),
        topic: Some(TopicId::new(topic)),
        difficulty: Default::default(),
    }
    .validate()
    .unwrap()
}

/// Result where the first `correct` questions of each listed topic were answered right.
pub(crate) fn result(plan: &[(&str, u32, u32)], at: DateTime<Utc>) -> QuizResult {
    let mut questions = Vec::new();
    let mut answers = Vec::new();
    let mut performance: IndexMap<TopicId, TopicTally> = IndexMap::new();
    for (topic, total, correct) in plan {
        for i in 0..*total {
            questions.push(question(&format!("{topic}-{i}"), topic));
            answers.push(Some(if i < *correct { 0 } else { 1 }));
        }
        performance.insert(
            TopicId::new(*topic),
            TopicTally {
                correct: *correct,
                incorrect: total - correct,
                total: *total,
            },
        );
    }
    let total: u32 = plan.iter().map(|(_, t, _)| t).sum();
    let correct: u32 = plan.iter().map(|(_, _, c)| c).sum();
    QuizResult {
        score: percentage(u64::from(correct), u64::from(total)),
        correct_answers: correct,
        total_questions: total,
        topics: plan.iter().map(|(t, _, _)| TopicId::new(*t)).collect(),
        timestamp: at,
        time_spent: 60,
        user_answers: answers,
        questions,
        topic_performance: performance,
    }
}
