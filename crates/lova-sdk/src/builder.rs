//! Builder pattern for Tuner

use crate::config::TunerConfig;
use crate::error::{Result, SdkError};
use crate::sampler::{EnqueuedSampler, LogUniformSampler, SearchSampler};
use crate::tuner::{Tuner, TunerSettings};
use lova_core::InteractionRecord;
use lova_runtime::{DotProductEvaluator, ImplicitAls, Preprocessor};
use tracing::info;

/// Tuner wired with the shipped factorizer and evaluator
pub type DefaultTuner = Tuner<ImplicitAls, DotProductEvaluator, Box<dyn SearchSampler>>;

/// Builder for Tuner
///
/// # Example
///
/// ```rust,ignore
/// use lova_sdk::{TunerBuilder, TunerConfig};
///
/// let mut tuner = TunerBuilder::new(config)
///     .with_training(train_records)
///     .with_holdout(holdout_records)
///     .build()?;
/// tuner.run()?;
/// let report = tuner.into_report();
/// ```
pub struct TunerBuilder {
    config: TunerConfig,
    training: Vec<InteractionRecord>,
    holdout: Vec<InteractionRecord>,
    sampler: Option<Box<dyn SearchSampler>>,
}

impl TunerBuilder {
    /// Create a new builder
    pub fn new(config: TunerConfig) -> Self {
        Self {
            config,
            training: Vec::new(),
            holdout: Vec::new(),
            sampler: None,
        }
    }

    /// Set the interactions the factorization is fitted on
    pub fn with_training(mut self, records: Vec<InteractionRecord>) -> Self {
        self.training = records;
        self
    }

    /// Set the held-out interactions every trial is scored on
    pub fn with_holdout(mut self, records: Vec<InteractionRecord>) -> Self {
        self.holdout = records;
        self
    }

    /// Replace the default seeded log-uniform sampler. The configured
    /// weights still run first when `evaluate_initial_weights` is set.
    pub fn with_sampler(mut self, sampler: Box<dyn SearchSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Validate the configuration, prepare the dataset and wire the tuner
    pub fn build(self) -> Result<DefaultTuner> {
        self.config.validate()?;
        if self.holdout.is_empty() {
            return Err(SdkError::ConfigError(
                "holdout set must not be empty".to_string(),
            ));
        }

        let preprocessor = Preprocessor::new(&self.training, self.config.preprocess_config())?;
        let (n_users, n_items) = preprocessor.shape();
        info!(
            "Prepared {} interactions ({} users x {} items)",
            preprocessor.len(),
            n_users,
            n_items
        );

        let evaluator = DotProductEvaluator::new(
            self.holdout.iter().map(|r| (&r.user, &r.item)),
            preprocessor.maps(),
        );
        let factorizer = ImplicitAls::new(self.config.als_config())?;
        let mut sampler = self
            .sampler
            .unwrap_or_else(|| Box::new(LogUniformSampler::new(self.config.seed)));
        if self.config.evaluate_initial_weights {
            sampler = Box::new(EnqueuedSampler::new(
                sampler,
                [self.config.initial_weights()],
            ));
        }

        Tuner::new(
            preprocessor,
            factorizer,
            evaluator,
            sampler,
            TunerSettings::from(&self.config),
        )
    }
}
