//! Feature pipeline shared by the trainer and the prediction server.
//!
//! Training fits the pieces in order (forward fill, label encoding, mean
//! imputation, standardization, random forest) and persists them as five
//! artifacts. Serving loads the same artifacts and replays
//! encode -> impute -> scale -> predict on a single record.

pub mod artifacts;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod forest;
pub mod imputer;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod scaler;
pub mod summary;
pub mod training;

pub use artifacts::{ArtifactBundle, ArtifactKind, ARTIFACT_SCHEMA, ARTIFACT_VERSION};
pub use dataset::Dataset;
pub use encoder::{LabelEncoder, UNSEEN_CODE};
pub use error::{PipelineError, Result};
pub use forest::{ForestParams, RandomForestRegressor};
pub use imputer::MeanImputer;
pub use pipeline::{EncodedRecord, FeaturePipeline, Prediction};
pub use record::{PredictionInput, RawRecord, FEATURE_ORDER, HOLIDAYS, N_FEATURES, WEATHER};
pub use scaler::StandardScaler;
pub use training::{train, TrainOutcome, TrainParams};
