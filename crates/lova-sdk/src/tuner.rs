//! Tuner - the weight search loop
//!
//! Each trial walks the same states:
//!
//! ```text
//! Idle → ProposeTrial → Rebuild → Refit → Evaluate → Record → ProposeTrial | Done
//! ```
//!
//! Rebuild fuses strengths for the proposed weights into a fresh matrix
//! over the fixed index maps, Refit trains a fresh factorization, and
//! Evaluate scores it on the holdout. The tuner owns all mutable state and
//! runs trials strictly one after another.

use crate::config::{SearchBounds, TrialErrorPolicy, TunerConfig};
use crate::error::{Result, SdkError};
use crate::sampler::{SearchSampler, SearchSpace};
use crate::trial::{TrialLog, TrialRecord};
use chrono::{DateTime, Utc};
use lova_core::StrengthWeights;
use lova_runtime::{
    ArtifactStore, CsrMatrix, Evaluator, FactorMatrices, Factorizer, IndexMaps, Preprocessor,
    RuntimeError,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Observable tuner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunerState {
    Idle,
    ProposeTrial,
    Rebuild,
    Refit,
    Evaluate,
    Record,
    Done,
}

/// Loop settings taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunerSettings {
    pub trial_budget: usize,
    pub bounds: SearchBounds,
    pub on_trial_error: TrialErrorPolicy,
}

impl From<&TunerConfig> for TunerSettings {
    fn from(config: &TunerConfig) -> Self {
        Self {
            trial_budget: config.trial_budget,
            bounds: config.search_bounds,
            on_trial_error: config.on_trial_error,
        }
    }
}

/// A trial in flight
#[derive(Debug)]
struct PendingTrial {
    number: usize,
    weights: StrengthWeights,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl PendingTrial {
    fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }
}

/// Internal state carrying the data each transition hands to the next
#[derive(Debug)]
enum Stage {
    Idle,
    ProposeTrial,
    Rebuild(PendingTrial),
    Refit(PendingTrial, CsrMatrix),
    Evaluate(PendingTrial, FactorMatrices),
    Record(PendingTrial, std::result::Result<(f64, FactorMatrices), String>),
    Done,
}

impl Stage {
    fn state(&self) -> TunerState {
        match self {
            Stage::Idle => TunerState::Idle,
            Stage::ProposeTrial => TunerState::ProposeTrial,
            Stage::Rebuild(_) => TunerState::Rebuild,
            Stage::Refit(..) => TunerState::Refit,
            Stage::Evaluate(..) => TunerState::Evaluate,
            Stage::Record(..) => TunerState::Record,
            Stage::Done => TunerState::Done,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct TuningReport {
    pub trials: TrialLog,
    /// Factors of the best trial
    pub best_factors: Option<FactorMatrices>,
    /// Index maps the factors are aligned to
    pub maps: IndexMaps,
}

impl TuningReport {
    pub fn best(&self) -> Option<&TrialRecord> {
        self.trials.best()
    }

    pub fn best_score(&self) -> Option<f64> {
        self.trials.best_score()
    }

    /// Persist index maps, best factors and the trial log
    pub fn save(&self, store: &ArtifactStore) -> Result<()> {
        store.save_index_maps(&self.maps)?;
        if let Some(factors) = &self.best_factors {
            store.save_factors(factors)?;
        }
        self.trials.save(store)?;
        info!("Saved tuning artifacts to {}", store.root().display());
        Ok(())
    }
}

/// Weight tuner over a prepared dataset
pub struct Tuner<F: Factorizer, E: Evaluator, S: SearchSampler> {
    preprocessor: Preprocessor,
    factorizer: F,
    evaluator: E,
    sampler: S,
    space: SearchSpace,
    settings: TunerSettings,
    stage: Stage,
    log: TrialLog,
    best_factors: Option<FactorMatrices>,
}

impl<F: Factorizer, E: Evaluator, S: SearchSampler> Tuner<F, E, S> {
    pub fn new(
        preprocessor: Preprocessor,
        factorizer: F,
        evaluator: E,
        sampler: S,
        settings: TunerSettings,
    ) -> Result<Self> {
        if settings.trial_budget == 0 {
            return Err(SdkError::ConfigError(
                "trial_budget must be at least 1".to_string(),
            ));
        }
        settings.bounds.validate()?;

        let space = SearchSpace::new(
            preprocessor.config().numeric_columns.clone(),
            preprocessor.config().field_num,
            settings.bounds,
        );

        Ok(Self {
            preprocessor,
            factorizer,
            evaluator,
            sampler,
            space,
            settings,
            stage: Stage::Idle,
            log: TrialLog::new(),
            best_factors: None,
        })
    }

    pub fn state(&self) -> TunerState {
        self.stage.state()
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    pub fn best(&self) -> Option<&TrialRecord> {
        self.log.best()
    }

    pub fn best_factors(&self) -> Option<&FactorMatrices> {
        self.best_factors.as_ref()
    }

    /// Advance by one transition and return the new state.
    ///
    /// An error from the sampler, or from a trial under the abort policy,
    /// leaves the tuner in `Done`.
    pub fn step(&mut self) -> Result<TunerState> {
        let stage = std::mem::replace(&mut self.stage, Stage::Done);
        let next = match stage {
            Stage::Idle => {
                info!(
                    "Starting tuning: {} trials over {} parameters, {} interactions",
                    self.settings.trial_budget,
                    self.space.dimensions(),
                    self.preprocessor.len()
                );
                Stage::ProposeTrial
            }
            Stage::ProposeTrial => self.propose()?,
            Stage::Rebuild(trial) => match self.preprocessor.build_matrix(&trial.weights) {
                Ok(matrix) => {
                    debug!("Trial {} matrix: {} non-zeros", trial.number, matrix.nnz());
                    Stage::Refit(trial, matrix)
                }
                Err(e) => self.fail(trial, e)?,
            },
            Stage::Refit(trial, matrix) => match self.factorizer.fit(&matrix) {
                Ok(factors) => Stage::Evaluate(trial, factors),
                Err(e) => self.fail(trial, e)?,
            },
            Stage::Evaluate(trial, factors) => match self.evaluator.evaluate(&factors) {
                Ok(score) => Stage::Record(trial, Ok((score, factors))),
                Err(e) => self.fail(trial, e)?,
            },
            Stage::Record(trial, outcome) => {
                self.record(trial, outcome);
                Stage::ProposeTrial
            }
            Stage::Done => Stage::Done,
        };
        self.stage = next;
        Ok(self.state())
    }

    /// Run every remaining trial
    pub fn run(&mut self) -> Result<()> {
        while self.step()? != TunerState::Done {}

        match self.log.best() {
            Some(best) => {
                info!(
                    "Tuning finished: best trial {} with score {:.6} ({}/{} complete)",
                    best.number,
                    best.score.unwrap_or(f64::NAN),
                    self.log.completed(),
                    self.log.len()
                );
                Ok(())
            }
            None => Err(SdkError::NoSuccessfulTrial(self.log.len())),
        }
    }

    /// Consume the tuner into its report
    pub fn into_report(self) -> TuningReport {
        TuningReport {
            trials: self.log,
            best_factors: self.best_factors,
            maps: self.preprocessor.maps().clone(),
        }
    }

    fn propose(&mut self) -> Result<Stage> {
        let number = self.log.len();
        if number >= self.settings.trial_budget {
            return Ok(Stage::Done);
        }
        let started_at = Utc::now();
        let clock = Instant::now();
        let weights = self.sampler.propose(number, &self.space, self.log.trials())?;
        debug!("Trial {} proposed: {:?}", number, weights);
        Ok(Stage::Rebuild(PendingTrial {
            number,
            weights,
            started_at,
            clock,
        }))
    }

    fn fail(&mut self, trial: PendingTrial, error: RuntimeError) -> Result<Stage> {
        warn!("Trial {} failed: {}", trial.number, error);
        match self.settings.on_trial_error {
            TrialErrorPolicy::Continue => Ok(Stage::Record(trial, Err(error.to_string()))),
            TrialErrorPolicy::Abort => {
                let number = trial.number;
                self.record(trial, Err(error.to_string()));
                Err(SdkError::TrialFailed {
                    number,
                    source: error,
                })
            }
        }
    }

    fn record(
        &mut self,
        trial: PendingTrial,
        outcome: std::result::Result<(f64, FactorMatrices), String>,
    ) {
        let duration_ms = trial.elapsed_ms();
        match outcome {
            Ok((score, factors)) => {
                let record = TrialRecord::complete(
                    trial.number,
                    trial.weights,
                    score,
                    trial.started_at,
                    duration_ms,
                );
                let improved = self.log.push(record);
                if improved {
                    self.best_factors = Some(factors);
                }
                info!(
                    "Trial {} finished with score {:.6} in {}ms{}",
                    trial.number,
                    score,
                    duration_ms,
                    if improved { " (new best)" } else { "" }
                );
            }
            Err(message) => {
                let record = TrialRecord::failed(
                    trial.number,
                    trial.weights,
                    message,
                    trial.started_at,
                    duration_ms,
                );
                self.log.push(record);
            }
        }
    }
}
