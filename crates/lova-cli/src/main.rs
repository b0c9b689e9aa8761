//! Lova tuning runner
//!
//! Reads training and held-out interactions, searches strength weights and
//! writes the best factorization with its index maps and the trial log.

pub mod config;
pub mod dataset;

use crate::config::CliConfig;
use anyhow::Result;
use lova_runtime::ArtifactStore;
use lova_sdk::TunerBuilder;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_NAME: &str = "config/lova";

fn main() -> Result<()> {
    // Load configuration
    let config = CliConfig::load_with_name(CONFIG_NAME)?;

    // Initialize tracing
    init_tracing(&config)?;
    match CliConfig::source_file(CONFIG_NAME) {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file found, using defaults and LOVA__* overrides"),
    }
    debug!("Configuration: {:?}", config);

    let tuner_config = config.tuner_config()?;

    let training = dataset::read_records(&config.train_path, config.format, &config.columns)?;
    let holdout = dataset::read_records(&config.holdout_path, config.format, &config.columns)?;
    info!(
        "Loaded {} training and {} held-out interactions",
        training.len(),
        holdout.len()
    );

    let mut tuner = TunerBuilder::new(tuner_config)
        .with_training(training)
        .with_holdout(holdout)
        .build()?;
    tuner.run()?;

    let report = tuner.into_report();
    let store = ArtifactStore::new(&config.output_dir)?;
    report.save(&store)?;

    if let Some(best) = report.best() {
        info!(
            "✓ Best trial {} scored {:.6} with weights {:?}",
            best.number,
            best.score.unwrap_or(f64::NAN),
            best.weights
        );
    }
    info!("  Artifacts: {}", store.root().display());

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(config: &CliConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
