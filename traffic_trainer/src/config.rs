//! Training hyperparameters from an optional JSON file.
//!
//! Every field is optional; missing ones keep their defaults
//! (100 trees, seed 42, 20% holdout).
//!
//! ```json
//! { "forest": { "n_trees": 200, "max_depth": 24 }, "test_size": 0.25 }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use traffic_pipeline::TrainParams;

pub fn load_params(path: Option<&Path>) -> Result<TrainParams> {
    let Some(path) = path else {
        return Ok(TrainParams::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read training config {}", path.display()))?;
    let params: TrainParams = serde_json::from_str(&data)
        .with_context(|| format!("invalid training config {}", path.display()))?;
    Ok(params)
}
