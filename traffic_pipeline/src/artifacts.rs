//! On-disk layout of a trained pipeline.
//!
//! Five JSON files, one per fitted object. Each file is wrapped in an
//! envelope carrying a schema tag, a format version, the artifact kind, the
//! id of the training run that produced it and the feature order. Loading
//! rejects any file that disagrees with the others or with this build.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encoder::LabelEncoder;
use crate::error::{PipelineError, Result};
use crate::forest::RandomForestRegressor;
use crate::imputer::MeanImputer;
use crate::record::{FEATURE_ORDER, N_FEATURES};
use crate::scaler::StandardScaler;

pub const ARTIFACT_SCHEMA: &str = "traffic-volume-artifact";
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Model,
    Scaler,
    Imputer,
    HolidayEncoder,
    WeatherEncoder,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Model,
        ArtifactKind::Scaler,
        ArtifactKind::Imputer,
        ArtifactKind::HolidayEncoder,
        ArtifactKind::WeatherEncoder,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Model => "best_model.json",
            ArtifactKind::Scaler => "scaler.json",
            ArtifactKind::Imputer => "imputer.json",
            ArtifactKind::HolidayEncoder => "encoder_holiday.json",
            ArtifactKind::WeatherEncoder => "encoder_weather.json",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Header {
    schema: String,
    version: u32,
    kind: ArtifactKind,
    run_id: String,
    feature_order: Vec<String>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    schema: &'static str,
    version: u32,
    kind: ArtifactKind,
    run_id: &'a str,
    feature_order: &'a [&'static str],
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    payload: T,
}

/// The five fitted objects of one training run.
#[derive(Debug)]
pub struct ArtifactBundle {
    pub run_id: String,
    pub model: RandomForestRegressor,
    pub scaler: StandardScaler,
    pub imputer: MeanImputer,
    pub holiday_encoder: LabelEncoder,
    pub weather_encoder: LabelEncoder,
}

impl ArtifactBundle {
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

        self.write_one(dir, ArtifactKind::Model, &self.model)?;
        self.write_one(dir, ArtifactKind::Scaler, &self.scaler)?;
        self.write_one(dir, ArtifactKind::Imputer, &self.imputer)?;
        self.write_one(dir, ArtifactKind::HolidayEncoder, &self.holiday_encoder)?;
        self.write_one(dir, ArtifactKind::WeatherEncoder, &self.weather_encoder)?;

        info!(dir = %dir.display(), run_id = %self.run_id, "artifacts saved");
        Ok(())
    }

    fn write_one<T: Serialize>(&self, dir: &Path, kind: ArtifactKind, payload: &T) -> Result<()> {
        let path = dir.join(kind.file_name());
        let file = File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
        let mut w = BufWriter::new(file);
        let env = EnvelopeRef {
            schema: ARTIFACT_SCHEMA,
            version: ARTIFACT_VERSION,
            kind,
            run_id: &self.run_id,
            feature_order: &FEATURE_ORDER,
            payload,
        };
        serde_json::to_writer(&mut w, &env)?;
        w.flush().map_err(|e| PipelineError::io(&path, e))?;
        debug!(path = %path.display(), "artifact written");
        Ok(())
    }

    /// Load and cross-check all five artifacts from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let (model_run, model) = read_one::<RandomForestRegressor>(dir, ArtifactKind::Model)?;
        let (scaler_run, scaler) = read_one::<StandardScaler>(dir, ArtifactKind::Scaler)?;
        let (imputer_run, imputer) = read_one::<MeanImputer>(dir, ArtifactKind::Imputer)?;
        let (holiday_run, holiday_encoder) = read_one::<LabelEncoder>(dir, ArtifactKind::HolidayEncoder)?;
        let (weather_run, weather_encoder) = read_one::<LabelEncoder>(dir, ArtifactKind::WeatherEncoder)?;

        for (kind, run) in [
            (ArtifactKind::Scaler, &scaler_run),
            (ArtifactKind::Imputer, &imputer_run),
            (ArtifactKind::HolidayEncoder, &holiday_run),
            (ArtifactKind::WeatherEncoder, &weather_run),
        ] {
            if *run != model_run {
                return Err(PipelineError::artifact(
                    kind.file_name(),
                    format!("run id {run} does not match model run id {model_run}"),
                ));
            }
        }

        let bundle = Self {
            run_id: model_run,
            model,
            scaler,
            imputer,
            holiday_encoder,
            weather_encoder,
        };
        bundle.check_dims()?;
        info!(dir = %dir.display(), run_id = %bundle.run_id, "artifacts loaded");
        Ok(bundle)
    }

    fn check_dims(&self) -> Result<()> {
        let dims = [
            (ArtifactKind::Model, self.model.n_features()),
            (ArtifactKind::Scaler, self.scaler.n_features()),
            (ArtifactKind::Imputer, self.imputer.n_features()),
        ];
        for (kind, n) in dims {
            if n != N_FEATURES {
                return Err(PipelineError::artifact(
                    kind.file_name(),
                    format!("expects {n} features, pipeline has {N_FEATURES}"),
                ));
            }
        }
        if self.scaler.scale.len() != N_FEATURES {
            return Err(PipelineError::artifact(
                ArtifactKind::Scaler.file_name(),
                "mean and scale lengths differ",
            ));
        }
        self.model
            .validate()
            .map_err(|e| PipelineError::artifact(ArtifactKind::Model.file_name(), e.to_string()))
    }
}

fn read_one<T: DeserializeOwned>(dir: &Path, kind: ArtifactKind) -> Result<(String, T)> {
    let name = kind.file_name();
    let path = dir.join(name);
    let text = fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;

    let header: Header = serde_json::from_str(&text)
        .map_err(|e| PipelineError::artifact(name, format!("unreadable header: {e}")))?;
    if header.schema != ARTIFACT_SCHEMA {
        return Err(PipelineError::artifact(
            name,
            format!("schema '{}' is not '{ARTIFACT_SCHEMA}'", header.schema),
        ));
    }
    if header.version != ARTIFACT_VERSION {
        return Err(PipelineError::artifact(
            name,
            format!("version {} is not supported (expected {ARTIFACT_VERSION})", header.version),
        ));
    }
    if header.kind != kind {
        return Err(PipelineError::artifact(
            name,
            format!("holds {:?}, expected {:?}", header.kind, kind),
        ));
    }
    if header.feature_order != FEATURE_ORDER {
        return Err(PipelineError::artifact(
            name,
            format!("feature order {:?} differs from {:?}", header.feature_order, FEATURE_ORDER),
        ));
    }

    let env: Envelope<T> = serde_json::from_str(&text)
        .map_err(|e| PipelineError::artifact(name, format!("bad payload: {e}")))?;
    Ok((header.run_id, env.payload))
}
