//! Held-out evaluation of factorization results

use crate::error::{Result, RuntimeError};
use crate::factorization::FactorMatrices;
use crate::index::IndexMaps;
use lova_core::RawId;
use tracing::{debug, warn};

/// Scores a fit against held-out data
pub trait Evaluator {
    fn evaluate(&self, factors: &FactorMatrices) -> Result<f64>;
}

/// Mean raw dot product of user and item vectors over held-out interactions.
///
/// Held-out pairs are mapped through the index maps used for training once,
/// at construction. A pair whose user or item is unmapped is dropped, never
/// imputed.
#[derive(Debug, Clone)]
pub struct DotProductEvaluator {
    pairs: Vec<(usize, usize)>,
    dropped: usize,
}

impl DotProductEvaluator {
    pub fn new<'a, I>(holdout: I, maps: &IndexMaps) -> Self
    where
        I: IntoIterator<Item = (&'a RawId, &'a RawId)>,
    {
        let mut pairs = Vec::new();
        let mut dropped = 0;
        for (user, item) in holdout {
            match maps.lookup(user, item) {
                Some(pair) => pairs.push(pair),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(
                "Dropped {} held-out interactions with ids unseen in training",
                dropped
            );
        }
        debug!("Evaluator retained {} held-out interactions", pairs.len());

        Self { pairs, dropped }
    }

    /// Retained (user index, item index) pairs
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Number of held-out rows dropped by the id mapping
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Evaluator for DotProductEvaluator {
    fn evaluate(&self, factors: &FactorMatrices) -> Result<f64> {
        if self.pairs.is_empty() {
            return Err(RuntimeError::EmptyEvaluationSet);
        }

        let mut total = 0.0;
        for &(user, item) in &self.pairs {
            total += factors.score(user, item)?;
        }
        let mean = total / self.pairs.len() as f64;

        if !mean.is_finite() {
            return Err(RuntimeError::NonFiniteScore(mean));
        }
        Ok(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexMap;
    use ndarray::array;

    fn maps() -> IndexMaps {
        IndexMaps {
            users: IndexMap::build(&[RawId::Int(1), RawId::Int(2)]),
            items: IndexMap::build(&[RawId::from("a"), RawId::from("b")]),
        }
    }

    fn factors() -> FactorMatrices {
        FactorMatrices::new(array![[1.0, 0.0], [0.0, 2.0]], array![[3.0, 1.0], [1.0, 1.0]])
            .unwrap()
    }

    #[test]
    fn test_mean_of_dot_products() {
        let holdout = vec![
            (RawId::Int(1), RawId::from("a")),
            (RawId::Int(2), RawId::from("b")),
        ];
        let evaluator = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), &maps());
        // (3 + 2) / 2
        assert_eq!(evaluator.evaluate(&factors()).unwrap(), 2.5);
    }

    #[test]
    fn test_unseen_ids_are_dropped() {
        let holdout = vec![
            (RawId::Int(1), RawId::from("a")),
            (RawId::Int(2), RawId::from("b")),
            (RawId::Int(99), RawId::from("a")),
            (RawId::Int(1), RawId::from("zzz")),
        ];
        let evaluator = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), &maps());

        assert_eq!(evaluator.pairs(), &[(0, 0), (1, 1)]);
        assert_eq!(evaluator.dropped(), 2);
        assert_eq!(evaluator.evaluate(&factors()).unwrap(), 2.5);
    }

    #[test]
    fn test_empty_evaluation_set() {
        let holdout = vec![(RawId::Int(99), RawId::from("a"))];
        let evaluator = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), &maps());

        assert!(matches!(
            evaluator.evaluate(&factors()),
            Err(RuntimeError::EmptyEvaluationSet)
        ));
    }

    #[test]
    fn test_factor_shape_checked() {
        let holdout = vec![(RawId::Int(2), RawId::from("b"))];
        let evaluator = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), &maps());
        let small = FactorMatrices::new(array![[1.0]], array![[1.0]]).unwrap();

        assert!(matches!(
            evaluator.evaluate(&small),
            Err(RuntimeError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_non_finite_score() {
        let holdout = vec![(RawId::Int(1), RawId::from("a"))];
        let evaluator = DotProductEvaluator::new(holdout.iter().map(|(u, i)| (u, i)), &maps());
        let broken = FactorMatrices::new(
            array![[f64::NAN, 0.0], [0.0, 0.0]],
            array![[1.0, 1.0], [1.0, 1.0]],
        )
        .unwrap();

        assert!(matches!(
            evaluator.evaluate(&broken),
            Err(RuntimeError::NonFiniteScore(_))
        ));
    }
}
