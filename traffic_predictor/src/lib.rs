//! Web form that predicts traffic volume from a trained pipeline.
//!
//! Artifacts are loaded once into a [`model::PredictContext`] and shared
//! read-only with every request.

pub mod config;
pub mod error;
pub mod model;
pub mod page;
pub mod routes;
pub mod types;

pub use config::PredictorConfig;
pub use error::PredictError;
pub use model::PredictContext;
pub use routes::{router, AppState};
