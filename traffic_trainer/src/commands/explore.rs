use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use traffic_pipeline::summary::DatasetSummary;
use traffic_pipeline::Dataset;

/// Write shape, first rows, descriptive statistics, missing-value counts,
/// weather frequencies, correlations and traffic by weather to a text file.
#[derive(Args, Debug, Clone)]
pub struct ExploreCommand {
    #[arg(long, env = "TRAFFIC_CSV", default_value = "traffic_volume.csv")]
    pub csv: PathBuf,

    /// Summary output path
    #[arg(long, default_value = "dataset_summary.txt")]
    pub out: PathBuf,
}

impl ExploreCommand {
    pub fn run(&self) -> Result<DatasetSummary> {
        let dataset = Dataset::from_path(&self.csv)
            .with_context(|| format!("failed to load {}", self.csv.display()))?;
        let summary = DatasetSummary::compute(&dataset);
        let text = summary.render();

        for (column, missing) in summary.missing.iter().filter(|(_, n)| *n > 0) {
            info!(column, missing, "missing values");
        }
        fs::write(&self.out, &text)
            .with_context(|| format!("failed to write {}", self.out.display()))?;
        println!("{text}");
        info!(out = %self.out.display(), "dataset summary saved");
        Ok(summary)
    }
}
