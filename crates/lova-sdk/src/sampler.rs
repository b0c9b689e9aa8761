//! Search samplers proposing weight configurations

use crate::config::SearchBounds;
use crate::error::{Result, SdkError};
use crate::trial::TrialRecord;
use lova_core::{NumericWeights, StrengthWeights};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::debug;

/// Shape of the weight search: which numeric columns, how many label bits,
/// and the range every weight is drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    pub numeric_columns: Vec<String>,
    pub field_num: usize,
    pub bounds: SearchBounds,
}

impl SearchSpace {
    pub fn new(numeric_columns: Vec<String>, field_num: usize, bounds: SearchBounds) -> Self {
        Self {
            numeric_columns,
            field_num,
            bounds,
        }
    }

    /// Number of searched parameters (numeric weights, bit weights, ratio)
    pub fn dimensions(&self) -> usize {
        self.numeric_columns.len() + self.field_num + 1
    }
}

/// Proposes the next configuration to evaluate
pub trait SearchSampler {
    fn propose(
        &mut self,
        trial: usize,
        space: &SearchSpace,
        history: &[TrialRecord],
    ) -> Result<StrengthWeights>;
}

impl<S: SearchSampler + ?Sized> SearchSampler for Box<S> {
    fn propose(
        &mut self,
        trial: usize,
        space: &SearchSpace,
        history: &[TrialRecord],
    ) -> Result<StrengthWeights> {
        (**self).propose(trial, space, history)
    }
}

/// Independent log-uniform draws for every weight, seeded for reproducibility
#[derive(Debug, Clone)]
pub struct LogUniformSampler {
    rng: StdRng,
}

impl LogUniformSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn draw(&mut self, bounds: &SearchBounds) -> f64 {
        if bounds.low >= bounds.high {
            return bounds.low;
        }
        let value = self.rng.gen_range(bounds.low.ln()..bounds.high.ln()).exp();
        value.clamp(bounds.low, bounds.high)
    }
}

impl SearchSampler for LogUniformSampler {
    fn propose(
        &mut self,
        trial: usize,
        space: &SearchSpace,
        _history: &[TrialRecord],
    ) -> Result<StrengthWeights> {
        let mut numeric = NumericWeights::new();
        for column in &space.numeric_columns {
            let weight = self.draw(&space.bounds);
            numeric.insert(column.clone(), weight);
        }
        let boolean: Vec<f64> = (0..space.field_num)
            .map(|_| self.draw(&space.bounds))
            .collect();
        let ratio = self.draw(&space.bounds);

        debug!("Trial {} proposal: ratio {:.4}", trial, ratio);
        Ok(StrengthWeights::new(numeric, boolean, ratio))
    }
}

/// Replays a fixed queue of configurations, for manual sweeps and tests
#[derive(Debug, Clone, Default)]
pub struct ReplaySampler {
    queue: VecDeque<StrengthWeights>,
}

impl ReplaySampler {
    pub fn new(configurations: impl IntoIterator<Item = StrengthWeights>) -> Self {
        Self {
            queue: configurations.into_iter().collect(),
        }
    }

    /// Remaining configurations
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl SearchSampler for ReplaySampler {
    fn propose(
        &mut self,
        trial: usize,
        _space: &SearchSpace,
        _history: &[TrialRecord],
    ) -> Result<StrengthWeights> {
        self.queue
            .pop_front()
            .ok_or(SdkError::SamplerExhausted(trial))
    }
}

/// Evaluates queued configurations first, then defers to the inner sampler.
///
/// The builder queues the configured weights so trial 0 always measures the
/// hand-tuned starting point.
#[derive(Debug, Clone)]
pub struct EnqueuedSampler<S> {
    queue: VecDeque<StrengthWeights>,
    inner: S,
}

impl<S: SearchSampler> EnqueuedSampler<S> {
    pub fn new(inner: S, queued: impl IntoIterator<Item = StrengthWeights>) -> Self {
        Self {
            queue: queued.into_iter().collect(),
            inner,
        }
    }
}

impl<S: SearchSampler> SearchSampler for EnqueuedSampler<S> {
    fn propose(
        &mut self,
        trial: usize,
        space: &SearchSpace,
        history: &[TrialRecord],
    ) -> Result<StrengthWeights> {
        match self.queue.pop_front() {
            Some(weights) => {
                debug!("Trial {} uses an enqueued configuration", trial);
                Ok(weights)
            }
            None => self.inner.propose(trial, space, history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> SearchSpace {
        SearchSpace::new(
            vec!["clicks".to_string(), "watch_time".to_string()],
            3,
            SearchBounds::default(),
        )
    }

    #[test]
    fn test_log_uniform_within_bounds() {
        let mut sampler = LogUniformSampler::new(7);
        let space = space();
        for trial in 0..50 {
            let weights = sampler.propose(trial, &space, &[]).unwrap();
            assert_eq!(weights.numeric.len(), 2);
            assert_eq!(weights.field_num(), 3);
            let all = weights
                .numeric
                .weights()
                .into_iter()
                .chain(weights.boolean.iter().copied())
                .chain(std::iter::once(weights.ratio));
            for value in all {
                assert!((0.1..=1000.0).contains(&value), "{} out of bounds", value);
            }
        }
    }

    #[test]
    fn test_log_uniform_is_seeded() {
        let space = space();
        let mut a = LogUniformSampler::new(42);
        let mut b = LogUniformSampler::new(42);
        for trial in 0..5 {
            assert_eq!(
                a.propose(trial, &space, &[]).unwrap(),
                b.propose(trial, &space, &[]).unwrap()
            );
        }
    }

    #[test]
    fn test_columns_keep_space_order() {
        let weights = LogUniformSampler::new(1).propose(0, &space(), &[]).unwrap();
        let columns: Vec<&str> = weights.numeric.columns().collect();
        assert_eq!(columns, vec!["clicks", "watch_time"]);
    }

    #[test]
    fn test_replay_sampler_exhausts() {
        let weights = StrengthWeights::new(NumericWeights::new(), vec![1.0], 1.0);
        let mut sampler = ReplaySampler::new(vec![weights.clone()]);
        assert_eq!(sampler.propose(0, &space(), &[]).unwrap(), weights);
        assert_eq!(sampler.remaining(), 0);
        assert!(matches!(
            sampler.propose(1, &space(), &[]),
            Err(SdkError::SamplerExhausted(1))
        ));
    }

    #[test]
    fn test_enqueued_before_inner() {
        let first = StrengthWeights::new(
            NumericWeights::new().with("clicks", 3.0),
            vec![1.0; 3],
            0.5,
        );
        let mut sampler = EnqueuedSampler::new(LogUniformSampler::new(11), vec![first.clone()]);
        let mut plain = LogUniformSampler::new(11);

        assert_eq!(sampler.propose(0, &space(), &[]).unwrap(), first);
        assert_eq!(
            sampler.propose(1, &space(), &[]).unwrap(),
            plain.propose(1, &space(), &[]).unwrap()
        );
    }

    #[test]
    fn test_boxed_sampler() {
        let mut sampler: Box<dyn SearchSampler> = Box::new(LogUniformSampler::new(3));
        assert!(sampler.propose(0, &space(), &[]).is_ok());
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(space().dimensions(), 6);
    }
}
