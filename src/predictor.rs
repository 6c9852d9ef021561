use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::PredictError;
use crate::features::{FeatureVector, ModelInput};
use crate::model::WinClassifier;
use crate::types::{MatchState, TeamOdds, WinProbability};
use crate::validate::validate;

/// Result of one validate → derive → predict pass.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub batting: TeamOdds,
    pub bowling: TeamOdds,
    pub features: FeatureVector,
    pub input: ModelInput,
}

impl Prediction {
    pub fn probabilities(&self) -> WinProbability {
        WinProbability {
            loss: self.bowling.probability,
            win: self.batting.probability,
        }
    }
}

/// Runs the prediction pipeline against a shared, read-only classifier.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn WinClassifier>,
}

impl Predictor {
    pub fn new(model: Arc<dyn WinClassifier>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn predict(&self, state: &MatchState) -> Result<Prediction, PredictError> {
        validate(state)?;

        let features = FeatureVector::derive(state);
        let input = ModelInput::new(state, &features);

        let missing = input.missing_columns();
        if !missing.is_empty() {
            return Err(PredictError::MissingValues(missing));
        }

        let model = &self.model;
        let probs = panic::catch_unwind(AssertUnwindSafe(|| model.predict_proba(&input)))
            .map_err(|payload| PredictError::Unexpected(panic_message(payload.as_ref())))??;

        Ok(Prediction {
            batting: TeamOdds::new(state.batting_team, probs.win),
            bowling: TeamOdds::new(state.bowling_team, probs.loss),
            features,
            input,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "classifier panicked".to_string()
    }
}
