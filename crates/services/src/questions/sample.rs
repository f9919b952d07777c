use rand::Rng;
use rand::seq::IndexedRandom;

use medquiz_core::format_topic_name;
use medquiz_core::model::{Difficulty, Question, QuestionDraft, QuestionId, TopicId};

/// Placeholder questions for a topic whose bank could not be loaded.
///
/// Text is a fixed template; only the difficulty label is drawn from `rng`.
/// Option 0 is always correct.
pub fn sample_questions<R: Rng + ?Sized>(
    topic: &TopicId,
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let name = format_topic_name(topic.as_str());
    (1..=count)
        .filter_map(|i| {
            QuestionDraft {
                id: QuestionId::new(format!("{topic}-{i}")),
                question: format!("Sample question {i} about {name}?"),
                options: vec![
                    format!("Correct answer for question {i}"),
                    format!("Incorrect option A for question {i}"),
                    format!("Incorrect option B for question {i}"),
                    format!("Incorrect option C for question {i}"),
                ],
                correct_answer: 0,
                explanation: format!(
                    "This is a sample explanation for question {i} about {name}. \
                     A real question bank explains why the correct answer is right \
                     and why the others are wrong."
                ),
                topic: Some(topic.clone()),
                difficulty: *Difficulty::ALL.choose(&mut *rng).unwrap_or(&Difficulty::Medium),
            }
            .validate()
            .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn samples_follow_template() {
        let mut rng = StdRng::seed_from_u64(7);
        let questions = sample_questions(&TopicId::new("upper-limb"), 3, &mut rng);

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].id().as_str(), "upper-limb-1");
        assert_eq!(questions[2].prompt(), "Sample question 3 about Upper Limb?");
        assert!(questions.iter().all(|q| q.correct_answer() == 0));
        assert!(questions.iter().all(|q| q.topic().as_str() == "upper-limb"));
    }

    #[test]
    fn same_seed_same_difficulties() {
        let topic = TopicId::new("thorax");
        let a = sample_questions(&topic, 10, &mut StdRng::seed_from_u64(42));
        let b = sample_questions(&topic, 10, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
