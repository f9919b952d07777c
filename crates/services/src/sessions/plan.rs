use rand::Rng;
use std::collections::HashSet;

use medquiz_core::model::Question;

/// Uniform in-place Fisher–Yates shuffle: from the last index down to 1,
/// swap with a uniformly chosen index in `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Questions selected for a session, with how the selection went.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    pub requested: usize,
    /// Distinct questions the provider returned.
    pub available: usize,
}

impl SessionPlan {
    /// True when fewer questions were available than requested.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.available < self.requested
    }
}

/// Drop repeated ids (first occurrence wins), shuffle, then keep at most `requested`.
pub fn plan_questions<R: Rng + ?Sized>(
    questions: Vec<Question>,
    requested: usize,
    rng: &mut R,
) -> SessionPlan {
    let mut seen = HashSet::new();
    let mut questions: Vec<Question> = questions
        .into_iter()
        .filter(|q| seen.insert(q.id().clone()))
        .collect();
    let available = questions.len();

    shuffle(&mut questions, rng);
    questions.truncate(requested);

    SessionPlan {
        questions,
        requested,
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::sample_questions;
    use medquiz_core::model::TopicId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut StdRng::seed_from_u64(3));
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(9));
        shuffle(&mut b, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut one = vec![1];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![1]);
    }

    #[test]
    fn plan_truncates_to_request() {
        let mut rng = StdRng::seed_from_u64(1);
        let bank = sample_questions(&TopicId::new("thorax"), 12, &mut rng);
        let plan = plan_questions(bank, 5, &mut rng);

        assert_eq!(plan.questions.len(), 5);
        assert_eq!(plan.available, 12);
        assert!(!plan.is_degraded());
    }

    #[test]
    fn plan_degrades_when_short_and_drops_duplicates() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bank = sample_questions(&TopicId::new("thorax"), 3, &mut rng);
        bank.push(bank[0].clone());
        let plan = plan_questions(bank, 5, &mut rng);

        assert_eq!(plan.questions.len(), 3);
        assert_eq!(plan.available, 3);
        assert!(plan.is_degraded());
    }
}
