//! Pure randomization helpers. Inputs are consumed and a new sequence is
//! returned; nothing is shuffled in place behind the caller's back.

use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::Question;

/// Returns `items` in a fresh, unseeded random order.
#[must_use]
pub fn shuffled<T>(items: Vec<T>) -> Vec<T> {
    shuffled_with(items, &mut rng())
}

/// Returns `items` shuffled with the given RNG.
#[must_use]
pub fn shuffled_with<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.as_mut_slice().shuffle(rng);
    items
}

/// Display order of a question's answers as original indices.
///
/// Identity order unless `randomize` is set, in which case every call yields
/// an independent permutation.
#[must_use]
pub fn answer_order(question: &Question, randomize: bool) -> Vec<usize> {
    let order: Vec<usize> = (0..question.answers().len()).collect();
    if randomize { shuffled(order) } else { order }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(answers: usize) -> Question {
        Question::new("Q", (0..answers).map(|i| i.to_string()).collect(), 0).unwrap()
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let input: Vec<u32> = (0..50).collect();
        let mut output = shuffled(input.clone());
        output.sort_unstable();
        assert_eq!(output, input);
    }

    #[test]
    fn shuffled_with_seed_is_reproducible() {
        let a = shuffled_with((0..20).collect::<Vec<u32>>(), &mut StdRng::seed_from_u64(7));
        let b = shuffled_with((0..20).collect::<Vec<u32>>(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn answer_order_is_identity_without_randomization() {
        assert_eq!(answer_order(&question(4), false), vec![0, 1, 2, 3]);
    }

    #[test]
    fn randomized_answer_order_covers_every_index() {
        let q = question(6);
        for _ in 0..20 {
            let mut order = answer_order(&q, true);
            order.sort_unstable();
            assert_eq!(order, (0..6).collect::<Vec<_>>());
        }
    }
}
