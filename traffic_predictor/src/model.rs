use std::path::Path;

use anyhow::{Context, Result};
use traffic_pipeline::{FeaturePipeline, Prediction, PredictionInput, HOLIDAYS, WEATHER};

use crate::error::PredictError;
use crate::types::PredictForm;

/// Loaded artifacts, built once at startup and never mutated.
pub struct PredictContext {
    pipeline: FeaturePipeline,
}

impl PredictContext {
    pub fn new(pipeline: FeaturePipeline) -> Self {
        Self { pipeline }
    }

    pub fn load(models_dir: &Path) -> Result<Self> {
        let pipeline = FeaturePipeline::load(models_dir)
            .with_context(|| format!("failed to load artifacts from {}", models_dir.display()))?;

        let unknown_holidays: Vec<&str> = HOLIDAYS
            .iter()
            .copied()
            .filter(|h| !pipeline.bundle().holiday_encoder.contains(h))
            .collect();
        let unknown_weather: Vec<&str> = WEATHER
            .iter()
            .copied()
            .filter(|w| !pipeline.bundle().weather_encoder.contains(w))
            .collect();
        if !unknown_holidays.is_empty() || !unknown_weather.is_empty() {
            tracing::warn!(
                ?unknown_holidays,
                ?unknown_weather,
                "form choices not seen in training will use the sentinel code"
            );
        }

        Ok(Self::new(pipeline))
    }

    pub fn run_id(&self) -> &str {
        self.pipeline.run_id()
    }

    pub fn predict(&self, input: &PredictionInput) -> Result<Prediction, PredictError> {
        Ok(self.pipeline.predict(input)?)
    }

    /// Parse a form submission and predict.
    pub fn predict_form(&self, form: &PredictForm) -> Result<Prediction, PredictError> {
        let input = PredictionInput {
            holiday: field(&form.holiday, "holiday")?.to_string(),
            temp: number(&form.temp, "temp")?,
            rain_1h: number(&form.rain, "rain")?,
            snow_1h: number(&form.snow, "snow")?,
            weather: field(&form.weather, "weather")?.to_string(),
        };
        self.predict(&input)
    }
}

fn field<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, PredictError> {
    value.as_deref().ok_or(PredictError::MissingField(name))
}

fn number(value: &Option<String>, name: &'static str) -> Result<f64, PredictError> {
    let raw = field(value, name)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| PredictError::InvalidNumber {
            field: name,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(temp: &str) -> PredictForm {
        PredictForm {
            holiday: Some("None".into()),
            temp: Some(temp.into()),
            rain: Some("0.0".into()),
            snow: Some("0".into()),
            weather: Some("Clouds".into()),
        }
    }

    #[test]
    fn numbers_accept_whitespace_and_nan() {
        assert_eq!(number(&Some(" 288.28 ".into()), "temp").unwrap(), 288.28);
        assert!(number(&Some("nan".into()), "temp").unwrap().is_nan());
    }

    #[test]
    fn non_numeric_is_invalid() {
        let err = number(&form("warm").temp, "temp").unwrap_err();
        assert!(matches!(err, PredictError::InvalidNumber { field: "temp", .. }));
        assert_eq!(
            err.to_string(),
            "could not convert string to float: 'warm' (field 'temp')"
        );
    }

    #[test]
    fn missing_and_empty_fields() {
        let mut f = form("280");
        f.snow = None;
        assert!(matches!(
            number(&f.snow, "snow"),
            Err(PredictError::MissingField("snow"))
        ));
        assert!(matches!(
            number(&Some(String::new()), "rain"),
            Err(PredictError::InvalidNumber { field: "rain", .. })
        ));
    }
}
