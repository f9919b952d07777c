use std::sync::Arc;

use medquiz_core::Catalog;
use medquiz_core::model::{Question, QuestionDraft, QuestionId, QuizConfig, TopicId};
use medquiz_core::time::fixed_now;
use services::{
    Clock, ProgressService, QuestionProvider, QuizWorkflow, StaticQuestionProvider,
};
use storage::repository::{Storage, StoreKey};

fn question(id: &str, topic: &str) -> Question {
    QuestionDraft {
        id: QuestionId::new(id),
        question: format!("{id}?"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: 0,
        explanation: "because".into(),
        topic: Some(TopicId::new(topic)),
        difficulty: Default::default(),
    }
    .validate()
    .expect("valid question")
}

fn workflow(storage: Storage, bank: Vec<Question>) -> QuizWorkflow {
    let clock = Clock::fixed(fixed_now());
    let progress = ProgressService::new(clock, storage.clone(), Arc::new(Catalog::medical()));
    let provider: Arc<dyn QuestionProvider> = Arc::new(StaticQuestionProvider::new(bank));
    QuizWorkflow::new(clock, provider, storage, progress).with_seed(7)
}

#[tokio::test]
async fn short_bank_yields_shorter_quiz_and_commits() {
    let storage = Storage::in_memory();
    let flow = workflow(
        storage.clone(),
        vec![
            question("t1", "upper-limb"),
            question("t2", "upper-limb"),
            question("t3", "upper-limb"),
        ],
    );

    let config = QuizConfig::new([TopicId::new("upper-limb")], 5).expect("config");
    let mut session = flow.start(config.clone()).await.expect("start");
    assert_eq!(session.total_questions(), 3);
    assert_eq!(
        flow.progress().last_config().await.unwrap(),
        Some(config)
    );

    for index in 0..session.total_questions() {
        assert!(session.record_answer(index, 0).expect("answer"));
    }
    assert!(session.is_complete());

    let finished = flow.finish(session).await.expect("finish");
    assert_eq!(finished.result.total_questions, 3);
    assert_eq!(finished.result.correct_answers, 3);
    assert_eq!(finished.result.score, 100);
    assert_eq!(finished.progress.total_quizzes(), 1);
    assert_eq!(finished.progress.overall_accuracy(), 100);

    let stored = flow.progress().last_results().await.unwrap().expect("results saved");
    assert_eq!(stored, finished.result);
}

#[tokio::test]
async fn weak_topic_surfaces_in_recommendations_and_reset_clears_it() {
    let storage = Storage::in_memory();
    let bank: Vec<Question> = (0..6).map(|i| question(&format!("r{i}"), "renal")).collect();
    let flow = workflow(storage.clone(), bank);

    let config = QuizConfig::new([TopicId::new("renal")], 6).expect("config");
    let mut session = flow.start(config).await.expect("start");
    session.record_answer(0, 0).unwrap();
    for index in 1..6 {
        session.record_answer(index, 2).unwrap();
    }
    let finished = flow.finish(session).await.expect("finish");

    let weak = finished.progress.weak_areas();
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0].topic.as_str(), "renal");
    assert_eq!(weak[0].accuracy, 17);

    let recommendations = flow.progress().recommendations().await.unwrap();
    assert_eq!(recommendations[0].message, "Focus on Renal");

    flow.progress().reset().await.expect("reset");
    assert!(storage.load::<serde_json::Value>(StoreKey::QuizResults).await.unwrap().is_none());
    let progress = flow.progress().load().await.unwrap();
    assert_eq!(progress.total_quizzes(), 0);
    assert!(progress.topics().is_empty());
}

#[tokio::test]
async fn empty_bank_starts_an_empty_session() {
    let flow = workflow(Storage::in_memory(), Vec::new());
    let config = QuizConfig::new([TopicId::new("thorax")], 10).expect("config");

    let session = flow.start(config).await.expect("start");
    assert_eq!(session.total_questions(), 0);
    assert_eq!(session.score().percentage, 0);
}
