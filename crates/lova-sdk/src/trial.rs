//! Trial records and the tuning history

use crate::error::Result;
use chrono::{DateTime, Utc};
use lova_core::StrengthWeights;
use lova_runtime::ArtifactStore;
use serde::{Deserialize, Serialize};

/// File name of the persisted trial log
pub const TRIALS_FILE: &str = "trials.json";

/// Final state of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialState {
    Complete,
    Failed,
}

/// One evaluated (or failed) weight configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Zero-based trial number
    pub number: usize,
    pub weights: StrengthWeights,
    pub state: TrialState,
    /// Metric value; present only for complete trials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Error message; present only for failed trials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl TrialRecord {
    pub fn complete(
        number: usize,
        weights: StrengthWeights,
        score: f64,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        Self {
            number,
            weights,
            state: TrialState::Complete,
            score: Some(score),
            error: None,
            started_at,
            duration_ms,
        }
    }

    pub fn failed(
        number: usize,
        weights: StrengthWeights,
        error: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        Self {
            number,
            weights,
            state: TrialState::Failed,
            score: None,
            error: Some(error.into()),
            started_at,
            duration_ms,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == TrialState::Complete
    }
}

/// Append-only trial history with the best complete trial tracked incrementally
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialLog {
    trials: Vec<TrialRecord>,
    best: Option<usize>,
}

#[derive(Serialize, Deserialize)]
struct TrialLogFile {
    trials: Vec<TrialRecord>,
    best: Option<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Returns true when it became the new best.
    ///
    /// The best is only replaced on a strictly greater score, so the
    /// earliest of equally scored trials wins.
    pub fn push(&mut self, record: TrialRecord) -> bool {
        let improved = match (record.score, self.best_score()) {
            (Some(score), Some(best)) => score > best,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            self.best = Some(self.trials.len());
        }
        self.trials.push(record);
        improved
    }

    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn best(&self) -> Option<&TrialRecord> {
        self.best.and_then(|index| self.trials.get(index))
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best().and_then(|trial| trial.score)
    }

    /// Number of complete trials
    pub fn completed(&self) -> usize {
        self.trials.iter().filter(|t| t.is_complete()).count()
    }

    /// Write `trials.json` (every record plus the best one)
    pub fn save(&self, store: &ArtifactStore) -> Result<()> {
        let file = TrialLogFile {
            trials: self.trials.clone(),
            best: self.best().cloned(),
        };
        store.write_json(TRIALS_FILE, &file)?;
        Ok(())
    }

    /// Read `trials.json` back, re-deriving the best trial from the records
    pub fn load(store: &ArtifactStore) -> Result<Self> {
        let file: TrialLogFile = store.read_json(TRIALS_FILE)?;
        let mut log = TrialLog::new();
        for record in file.trials {
            log.push(record);
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lova_core::NumericWeights;

    fn weights(ratio: f64) -> StrengthWeights {
        StrengthWeights::new(NumericWeights::new().with("clicks", 1.0), vec![1.0], ratio)
    }

    fn complete(number: usize, score: f64) -> TrialRecord {
        TrialRecord::complete(number, weights(1.0), score, Utc::now(), 1)
    }

    #[test]
    fn test_best_is_strictly_greater() {
        let mut log = TrialLog::new();
        assert!(log.push(complete(0, 0.3)));
        assert!(!log.push(complete(1, 0.3)));
        assert!(log.push(complete(2, 0.7)));
        assert!(!log.push(complete(3, 0.5)));

        assert_eq!(log.best().map(|t| t.number), Some(2));
        assert_eq!(log.best_score(), Some(0.7));
    }

    #[test]
    fn test_failed_trials_never_win() {
        let mut log = TrialLog::new();
        assert!(!log.push(TrialRecord::failed(0, weights(1.0), "boom", Utc::now(), 0)));
        assert!(log.best().is_none());
        assert!(log.push(complete(1, -2.0)));
        assert_eq!(log.completed(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_failed_record_serialization() {
        let record = TrialRecord::failed(4, weights(2.0), "Empty evaluation set", Utc::now(), 3);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["error"], "Empty evaluation set");
        assert!(json.get("score").is_none());
    }
}
