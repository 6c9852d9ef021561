use thiserror::Error;

/// Why a submitted match state was rejected before reaching the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Overs completed must be between 0 and 20.")]
    OversOutOfRange,

    #[error("Target must be greater than the current score.")]
    TargetNotAboveScore,

    #[error("Overs completed cannot be zero.")]
    ZeroOvers,

    #[error("Wickets fallen must be between 0 and 10.")]
    WicketsOutOfRange,

    #[error("Batting and bowling team must be different.")]
    SameTeams,
}

/// Failures raised by a classifier backend.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model schema mismatch: {0}")]
    Schema(String),

    #[error("unknown category {value:?} for column {column}")]
    UnknownCategory { column: &'static str, value: String },

    #[error("feature length mismatch: got {got}, expected {expected}")]
    FeatureLength { got: usize, expected: usize },

    #[error("model produced invalid output: {0}")]
    InvalidOutput(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "torch")]
    #[error("torch runtime error: {0}")]
    Torch(#[from] tch::TchError),
}

impl ModelError {
    /// True when the classifier refused the shape or content of its input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ModelError::Schema(_) | ModelError::UnknownCategory { .. } | ModelError::FeatureLength { .. }
        )
    }
}

/// Outcome of a failed prediction request. Every variant ends the request only.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("There are missing values in the input data: {}.", .0.join(", "))]
    MissingValues(Vec<&'static str>),

    #[error("An error occurred during prediction: {0}. Please check the model input features and types.")]
    PredictionFailed(ModelError),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PredictError {
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Validation(_) => "validation",
            PredictError::MissingValues(_) => "missing_values",
            PredictError::PredictionFailed(_) => "prediction_failed",
            PredictError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<ModelError> for PredictError {
    fn from(e: ModelError) -> Self {
        if e.is_contract_violation() {
            PredictError::PredictionFailed(e)
        } else {
            PredictError::Unexpected(e.to_string())
        }
    }
}
