//! Train command: CSV in, five artifacts out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use traffic_pipeline::{train, Dataset, TrainOutcome};

use crate::config::load_params;

/// Fit the feature pipeline and random forest, report holdout RMSE and
/// write the artifacts.
///
/// Flags override values from `--config`.
#[derive(Args, Debug, Clone)]
pub struct TrainCommand {
    /// Historical dataset
    #[arg(long, env = "TRAFFIC_CSV", default_value = "traffic_volume.csv")]
    pub csv: PathBuf,

    /// Directory the artifacts are written to
    #[arg(long, env = "TRAFFIC_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// JSON file with training hyperparameters
    #[arg(long, env = "TRAFFIC_TRAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of trees in the forest
    #[arg(long)]
    pub n_trees: Option<usize>,

    /// Maximum tree depth (unlimited when absent)
    #[arg(long)]
    pub max_depth: Option<u16>,

    /// Seed for bootstrap sampling and the holdout split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Share of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,
}

impl TrainCommand {
    pub fn run(&self) -> Result<TrainOutcome> {
        let mut params = load_params(self.config.as_deref())?;
        if let Some(n) = self.n_trees {
            params.forest.n_trees = n;
        }
        if let Some(d) = self.max_depth {
            params.forest.max_depth = Some(d);
        }
        if let Some(s) = self.seed {
            params.forest.seed = s;
            params.split_seed = s;
        }
        if let Some(t) = self.test_size {
            params.test_size = t;
        }

        info!(csv = %self.csv.display(), "loading dataset");
        let dataset = Dataset::from_path(&self.csv)
            .with_context(|| format!("failed to load {}", self.csv.display()))?;

        let outcome = train(dataset, &params).context("training failed")?;
        println!("Model RMSE: {:.2}", outcome.rmse);

        outcome
            .bundle
            .save(&self.models_dir)
            .with_context(|| format!("failed to save artifacts to {}", self.models_dir.display()))?;
        info!(
            dir = %self.models_dir.display(),
            run_id = %outcome.bundle.run_id,
            "training complete, all artifacts saved"
        );
        Ok(outcome)
    }
}
