use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifacts::ArtifactBundle;
use crate::dataset::Dataset;
use crate::encoder::LabelEncoder;
use crate::error::{PipelineError, Result};
use crate::forest::{dense, ForestParams, RandomForestRegressor};
use crate::imputer::MeanImputer;
use crate::metrics::{holdout, rmse};
use crate::record::{RawRecord, FEATURE_ORDER, MISSING_CATEGORY, N_FEATURES};
use crate::scaler::StandardScaler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub forest: ForestParams,
    /// Share of rows held out for evaluation.
    pub test_size: f64,
    pub split_seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            forest: ForestParams::default(),
            test_size: 0.2,
            split_seed: 42,
        }
    }
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub bundle: ArtifactBundle,
    pub rmse: f64,
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Rows dropped because the target was missing even after forward fill.
    pub dropped_rows: usize,
}

fn category(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING_CATEGORY)
}

fn feature_matrix(
    rows: &[&RawRecord],
    holiday: &LabelEncoder,
    weather: &LabelEncoder,
) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(rows.len() * N_FEATURES);
    for r in rows {
        flat.extend([
            holiday.encode_or_sentinel(category(&r.holiday)),
            r.temp.unwrap_or(f64::NAN),
            r.rain_1h.unwrap_or(f64::NAN),
            r.snow_1h.unwrap_or(f64::NAN),
            weather.encode_or_sentinel(category(&r.weather)),
        ]);
    }
    Array2::from_shape_vec((rows.len(), N_FEATURES), flat)
        .map_err(|e| PipelineError::InvalidParam(format!("feature matrix: {e}")))
}

/// Millisecond clock, seed and a random nonce, so two runs finishing in the
/// same millisecond with the same seed still differ.
fn new_run_id(seed: u64) -> String {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let nonce: u32 = rand::random();
    format!("{ms:x}-s{seed}-{nonce:08x}")
}

/// Fit the whole pipeline on `dataset` and evaluate it on a holdout split.
pub fn train(mut dataset: Dataset, params: &TrainParams) -> Result<TrainOutcome> {
    params.forest.validate()?;
    dataset.forward_fill();

    let rows: Vec<&RawRecord> = dataset
        .rows
        .iter()
        .filter(|r| r.traffic_volume.is_some())
        .collect();
    let dropped_rows = dataset.len() - rows.len();
    if dropped_rows > 0 {
        warn!(dropped_rows, "rows without a target after forward fill were dropped");
    }
    if rows.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let holiday_encoder = LabelEncoder::fit(rows.iter().map(|r| category(&r.holiday)));
    let weather_encoder = LabelEncoder::fit(rows.iter().map(|r| category(&r.weather)));
    info!(
        holidays = holiday_encoder.len(),
        weather = weather_encoder.len(),
        "categorical columns encoded"
    );

    let mut x = feature_matrix(&rows, &holiday_encoder, &weather_encoder)?;
    let y: Vec<f64> = rows.iter().filter_map(|r| r.traffic_volume).collect();

    for (name, col) in FEATURE_ORDER.iter().zip(x.axis_iter(Axis(1))) {
        let missing = MeanImputer::count_missing(col);
        if missing > 0 {
            info!(feature = *name, missing, "imputing leading gaps with column mean");
        }
    }
    let imputer = MeanImputer::fit(&x)?;
    imputer.transform_inplace(&mut x)?;

    let scaler = StandardScaler::fit(&x)?;
    scaler.transform_inplace(&mut x)?;

    let split = holdout(&dense(&x), &y, params.test_size, params.split_seed)?;
    let (n_train, n_test) = (split.y_train.len(), split.y_test.len());
    info!(train = n_train, test = n_test, "holdout split");

    info!(trees = params.forest.n_trees, seed = params.forest.seed, "training random forest");
    let model =
        RandomForestRegressor::fit(&split.x_train, &split.y_train, x.ncols(), &params.forest)?;
    let predicted = model.predict(&split.x_test)?;
    let score = rmse(&split.y_test, &predicted)?;
    info!("model RMSE: {score:.2}");

    Ok(TrainOutcome {
        bundle: ArtifactBundle {
            run_id: new_run_id(params.forest.seed),
            model,
            scaler,
            imputer,
            holiday_encoder,
            weather_encoder,
        },
        rmse: score,
        n_rows: rows.len(),
        n_train,
        n_test,
        dropped_rows,
    })
}
