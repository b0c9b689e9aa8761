//! Configuration types for the Tuner

use crate::error::{Result, SdkError};
use lova_core::{NumericWeights, StrengthWeights};
use lova_runtime::{AlsConfig, PreprocessConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main tuning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Column → weight mapping, in declaration order
    #[serde(default)]
    pub numeric_strength_dict: NumericWeights,

    /// Weights over decoded label bits, most significant bit first
    pub bool_strength_vector: Vec<f64>,

    /// Blend scalar applied to the numeric side
    #[serde(default = "default_ratio")]
    pub numerical_bool_ratio: f64,

    /// Cap quantile in (0, 1]
    #[serde(default = "default_percentile")]
    pub percentile: f64,

    /// Latent dimension
    #[serde(default = "default_factors")]
    pub factors: usize,

    /// L2 penalty
    #[serde(default = "default_regularization")]
    pub regularization: f64,

    /// Confidence scale
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// ALS sweeps per fit
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Number of trials
    #[serde(default = "default_trial_budget")]
    pub trial_budget: usize,

    /// Seeds both the sampler and the factor initialization
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Bounds of the log-uniform weight search
    #[serde(default)]
    pub search_bounds: SearchBounds,

    /// What a failing trial does to the run
    #[serde(default)]
    pub on_trial_error: TrialErrorPolicy,

    /// Evaluate the configured weights as trial 0 before sampling
    #[serde(default = "default_evaluate_initial_weights")]
    pub evaluate_initial_weights: bool,
}

fn default_ratio() -> f64 {
    0.5
}

fn default_percentile() -> f64 {
    lova_core::aggregators::percentile::DEFAULT_PERCENTILE
}

fn default_factors() -> usize {
    64
}

fn default_regularization() -> f64 {
    0.05
}

fn default_alpha() -> f64 {
    2.0
}

fn default_iterations() -> usize {
    15
}

fn default_trial_budget() -> usize {
    20
}

fn default_seed() -> u64 {
    42
}

fn default_evaluate_initial_weights() -> bool {
    true
}

impl TunerConfig {
    /// Create a configuration with the given initial weights and defaults elsewhere
    pub fn new(numeric_strength_dict: NumericWeights, bool_strength_vector: Vec<f64>) -> Self {
        Self {
            numeric_strength_dict,
            bool_strength_vector,
            numerical_bool_ratio: default_ratio(),
            percentile: default_percentile(),
            factors: default_factors(),
            regularization: default_regularization(),
            alpha: default_alpha(),
            iterations: default_iterations(),
            trial_budget: default_trial_budget(),
            seed: default_seed(),
            search_bounds: SearchBounds::default(),
            on_trial_error: TrialErrorPolicy::default(),
            evaluate_initial_weights: default_evaluate_initial_weights(),
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: TunerConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Set the blend ratio
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.numerical_bool_ratio = ratio;
        self
    }

    /// Set the cap quantile
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    /// Set the trial budget
    pub fn with_trial_budget(mut self, trial_budget: usize) -> Self {
        self.trial_budget = trial_budget;
        self
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the latent dimension
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    /// Set the number of ALS sweeps
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the search bounds
    pub fn with_search_bounds(mut self, low: f64, high: f64) -> Self {
        self.search_bounds = SearchBounds { low, high };
        self
    }

    /// Set the trial failure policy
    pub fn with_trial_error_policy(mut self, policy: TrialErrorPolicy) -> Self {
        self.on_trial_error = policy;
        self
    }

    /// Toggle the trial-0 evaluation of the configured weights
    pub fn with_initial_trial(mut self, enabled: bool) -> Self {
        self.evaluate_initial_weights = enabled;
        self
    }

    /// The configured weights, evaluated as trial 0 unless disabled
    pub fn initial_weights(&self) -> StrengthWeights {
        StrengthWeights::new(
            self.numeric_strength_dict.clone(),
            self.bool_strength_vector.clone(),
            self.numerical_bool_ratio,
        )
    }

    pub fn als_config(&self) -> AlsConfig {
        AlsConfig {
            factors: self.factors,
            regularization: self.regularization,
            alpha: self.alpha,
            iterations: self.iterations,
            seed: self.seed,
        }
    }

    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig::for_weights(&self.initial_weights(), self.percentile)
    }

    /// Check every option before any data is touched
    pub fn validate(&self) -> Result<()> {
        if self.bool_strength_vector.is_empty() {
            return Err(SdkError::ConfigError(
                "bool_strength_vector must not be empty".to_string(),
            ));
        }
        if self.bool_strength_vector.len() > lova_core::aggregators::label::MAX_FIELD_NUM {
            return Err(SdkError::ConfigError(format!(
                "bool_strength_vector has {} entries, at most {} are supported",
                self.bool_strength_vector.len(),
                lova_core::aggregators::label::MAX_FIELD_NUM
            )));
        }
        if !(self.percentile > 0.0 && self.percentile <= 1.0) {
            return Err(SdkError::ConfigError(format!(
                "percentile must be in (0, 1], got {}",
                self.percentile
            )));
        }
        if self.trial_budget == 0 {
            return Err(SdkError::ConfigError(
                "trial_budget must be at least 1".to_string(),
            ));
        }
        self.search_bounds.validate()?;
        self.initial_weights()
            .validate()
            .map_err(|e| SdkError::ConfigError(e.to_string()))?;
        self.als_config()
            .validate()
            .map_err(|e| SdkError::ConfigError(e.to_string()))?;
        Ok(())
    }
}

/// Log-uniform search bounds shared by every weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub low: f64,
    pub high: f64,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            low: 0.1,
            high: 1000.0,
        }
    }
}

impl SearchBounds {
    pub fn validate(&self) -> Result<()> {
        if !(self.low.is_finite() && self.high.is_finite() && self.low > 0.0) {
            return Err(SdkError::ConfigError(format!(
                "search bounds must be positive and finite, got [{}, {}]",
                self.low, self.high
            )));
        }
        if self.low > self.high {
            return Err(SdkError::ConfigError(format!(
                "search bounds are inverted: low {} > high {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Trial failure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialErrorPolicy {
    /// Record the failed trial, then stop the run with its error
    #[default]
    Abort,
    /// Record the failed trial and move on to the next one
    Continue,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TunerConfig {
        TunerConfig::new(
            NumericWeights::new().with("A", 0.5).with("B", 1.5),
            vec![1.0, 2.0],
        )
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.numerical_bool_ratio, 0.5);
        assert_eq!(config.percentile, 0.999);
        assert_eq!(config.trial_budget, 20);
        assert_eq!(config.als_config(), AlsConfig::default());
        assert_eq!(config.on_trial_error, TrialErrorPolicy::Abort);
        assert!(config.evaluate_initial_weights);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preprocess_config_follows_weights() {
        let preprocess = config().with_percentile(0.9).preprocess_config();
        assert_eq!(preprocess.numeric_columns, vec!["A", "B"]);
        assert_eq!(preprocess.field_num, 2);
        assert_eq!(preprocess.percentile, 0.9);
    }

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = r#"
numeric_strength_dict:
  watch_time: 2.0
  clicks: 1.0
bool_strength_vector: [1.0, 0.5, 0.25]
trial_budget: 5
on_trial_error: continue
"#;
        let config = TunerConfig::from_yaml_str(yaml).unwrap();
        let columns: Vec<&str> = config.numeric_strength_dict.columns().collect();
        assert_eq!(columns, vec!["watch_time", "clicks"]);
        assert_eq!(config.trial_budget, 5);
        assert_eq!(config.factors, 64);
        assert_eq!(config.search_bounds, SearchBounds::default());
        assert_eq!(config.on_trial_error, TrialErrorPolicy::Continue);
        assert!(config.evaluate_initial_weights);
    }

    #[test]
    fn test_validation_failures() {
        let empty_bool = TunerConfig::new(NumericWeights::new(), vec![]);
        assert!(matches!(empty_bool.validate(), Err(SdkError::ConfigError(_))));

        assert!(config().with_percentile(0.0).validate().is_err());
        assert!(config().with_percentile(1.5).validate().is_err());
        assert!(config().with_trial_budget(0).validate().is_err());
        assert!(config().with_search_bounds(10.0, 1.0).validate().is_err());
        assert!(config().with_search_bounds(0.0, 1.0).validate().is_err());
        assert!(config().with_factors(0).validate().is_err());
        assert!(config().with_ratio(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = TunerConfig::from_yaml_str("bool_strength_vector: not-a-list");
        assert!(matches!(result, Err(SdkError::YamlParse(_))));
    }
}
