//! Live IPL chase win probability.
//!
//! A submitted [`MatchState`] is validated, turned into the nine-column row the
//! classifier was fitted on, and scored by a [`WinClassifier`] loaded once at
//! startup.

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod overs;
pub mod predictor;
pub mod types;
pub mod validate;
pub mod web;

pub use error::{ModelError, PredictError, ValidationError};
pub use features::{FeatureVector, ModelInput};
pub use model::{LogisticPipeline, WinClassifier};
pub use overs::Overs;
pub use predictor::{Prediction, Predictor};
pub use types::{City, MatchState, Team, WinProbability};
pub use validate::validate;
