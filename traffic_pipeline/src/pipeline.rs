use std::path::Path;

use tracing::warn;

use crate::artifacts::ArtifactBundle;
use crate::encoder::UNSEEN_CODE;
use crate::error::Result;
use crate::record::{
    PredictionInput, HOLIDAY_IDX, N_FEATURES, RAIN_IDX, SNOW_IDX, TEMP_IDX, WEATHER_IDX,
};

/// Feature vector in training column order, before imputation and scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub features: [f64; N_FEATURES],
    /// Categorical fields that fell back to the sentinel code.
    pub unseen: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub rounded: i64,
    pub unseen: Vec<&'static str>,
}

impl Prediction {
    pub fn display_line(&self) -> String {
        format!("Predicted Traffic Volume: {}", self.rounded)
    }
}

/// Applies a fitted artifact bundle to single records:
/// encode -> impute -> scale -> predict.
#[derive(Debug)]
pub struct FeaturePipeline {
    bundle: ArtifactBundle,
}

impl FeaturePipeline {
    pub fn new(bundle: ArtifactBundle) -> Self {
        Self { bundle }
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        ArtifactBundle::load(dir).map(Self::new)
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn run_id(&self) -> &str {
        &self.bundle.run_id
    }

    pub fn encode(&self, input: &PredictionInput) -> EncodedRecord {
        let mut features = [0.0; N_FEATURES];
        let mut unseen = Vec::new();

        features[HOLIDAY_IDX] = self.bundle.holiday_encoder.encode_or_sentinel(&input.holiday);
        if features[HOLIDAY_IDX] == UNSEEN_CODE {
            unseen.push("holiday");
        }
        features[TEMP_IDX] = input.temp;
        features[RAIN_IDX] = input.rain_1h;
        features[SNOW_IDX] = input.snow_1h;
        features[WEATHER_IDX] = self.bundle.weather_encoder.encode_or_sentinel(&input.weather);
        if features[WEATHER_IDX] == UNSEEN_CODE {
            unseen.push("weather");
        }

        EncodedRecord { features, unseen }
    }

    /// Imputed and standardized vector, ready for the model.
    pub fn transform(&self, encoded: &EncodedRecord) -> Result<Vec<f64>> {
        let mut row = encoded.features.to_vec();
        self.bundle.imputer.transform_row(&mut row)?;
        self.bundle.scaler.transform_row(&mut row)?;
        Ok(row)
    }

    pub fn predict(&self, input: &PredictionInput) -> Result<Prediction> {
        let encoded = self.encode(input);
        if !encoded.unseen.is_empty() {
            warn!(
                fields = ?encoded.unseen,
                holiday = %input.holiday,
                weather = %input.weather,
                "unseen category, using sentinel code"
            );
        }
        let row = self.transform(&encoded)?;
        let value = self.bundle.model.predict_row(&row)?;
        Ok(Prediction {
            value,
            rounded: value.round_ties_even() as i64,
            unseen: encoded.unseen,
        })
    }
}
