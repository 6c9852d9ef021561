use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::error::ModelError;
use crate::features::{ModelInput, CATEGORICAL_COLUMNS, FEATURE_COLUMNS, NUMERIC_COLUMNS};
use crate::types::WinProbability;

/// A pre-trained binary classifier over the nine-column match schema.
///
/// Loaded once at startup and shared read-only between requests.
pub trait WinClassifier: Send + Sync {
    fn predict_proba(&self, row: &ModelInput) -> Result<WinProbability, ModelError>;

    fn name(&self) -> &'static str;
}

fn check_feat_list(feat_list: &[String]) -> Result<(), ModelError> {
    if feat_list.len() != FEATURE_COLUMNS.len() {
        return Err(ModelError::FeatureLength {
            got: feat_list.len(),
            expected: FEATURE_COLUMNS.len(),
        });
    }
    for (got, want) in feat_list.iter().zip(FEATURE_COLUMNS) {
        if got != want {
            return Err(ModelError::Schema(format!("expected column {want}, found {got}")));
        }
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ModelError> {
    let txt = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&txt)?)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ---------- One-hot + logistic regression ----------

/// One-hot encoded categoricals plus numeric coefficients feeding a logistic
/// link. Categories absent from a column's table are rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticPipeline {
    feat_list: Vec<String>,
    categories: HashMap<String, HashMap<String, f64>>,
    coefficients: HashMap<String, f64>,
    intercept: f64,
}

impl LogisticPipeline {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let pipeline: Self = read_json(path.as_ref())?;
        pipeline.check()?;
        Ok(pipeline)
    }

    pub fn from_json(txt: &str) -> Result<Self, ModelError> {
        let pipeline: Self = serde_json::from_str(txt)?;
        pipeline.check()?;
        Ok(pipeline)
    }

    fn check(&self) -> Result<(), ModelError> {
        check_feat_list(&self.feat_list)?;
        for column in CATEGORICAL_COLUMNS {
            if !self.categories.contains_key(column) {
                return Err(ModelError::Schema(format!("no categories for {column}")));
            }
        }
        for column in NUMERIC_COLUMNS {
            if !self.coefficients.contains_key(column) {
                return Err(ModelError::Schema(format!("no coefficient for {column}")));
            }
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::Schema("intercept is not finite".into()));
        }
        Ok(())
    }

    fn logit(&self, row: &ModelInput) -> Result<f64, ModelError> {
        // feat_list was checked against FEATURE_COLUMNS at load
        let mut z = self.intercept;
        for column in FEATURE_COLUMNS {
            if let Some(value) = row.categorical(column) {
                let weight = self
                    .categories
                    .get(column)
                    .and_then(|table| table.get(value))
                    .ok_or_else(|| ModelError::UnknownCategory {
                        column,
                        value: value.to_string(),
                    })?;
                z += weight;
            } else if let Some(x) = row.numeric(column) {
                z += self.coefficients[column] * x;
            } else {
                return Err(ModelError::Schema(format!("unknown column {column}")));
            }
        }
        Ok(z)
    }
}

impl WinClassifier for LogisticPipeline {
    fn predict_proba(&self, row: &ModelInput) -> Result<WinProbability, ModelError> {
        let z = self.logit(row)?;
        let win = sigmoid(z);
        if !win.is_finite() {
            return Err(ModelError::InvalidOutput(format!("logit {z}")));
        }
        Ok(WinProbability::from_win(win))
    }

    fn name(&self) -> &'static str {
        "logistic"
    }
}

// ---------- TorchScript ----------

#[cfg(feature = "torch")]
pub use torch::TorchModel;

#[cfg(feature = "torch")]
mod torch {
    use super::*;
    use tch::{kind::Kind, CModule, Device, Tensor};

    #[derive(Debug, Deserialize)]
    struct MetaJson {
        feat_list: Vec<String>,
        /// Vocabulary per categorical column, in one-hot order.
        categories: HashMap<String, Vec<String>>,
    }

    /// TorchScript module taking `[1, in_dim]` (one-hot block then numerics)
    /// and returning `[1, 2]` logits ordered `[loss, win]`.
    pub struct TorchModel {
        model: CModule,
        device: Device,
        vocab: Vec<Vec<String>>,
        in_dim: usize,
    }

    impl TorchModel {
        pub fn new(model_path: &Path, meta_path: &Path) -> Result<Self, ModelError> {
            let device = Device::Cpu;

            let meta: MetaJson = read_json(meta_path)?;
            check_feat_list(&meta.feat_list)?;

            let mut vocab = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
            for column in CATEGORICAL_COLUMNS {
                let values = meta
                    .categories
                    .get(column)
                    .ok_or_else(|| ModelError::Schema(format!("no categories for {column}")))?;
                vocab.push(values.clone());
            }
            let in_dim = vocab.iter().map(Vec::len).sum::<usize>() + NUMERIC_COLUMNS.len();

            let model = CModule::load_on_device(model_path, device)?;

            // Probe output shape with a dummy forward; expect [1, 2]
            let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
            let t = model.forward_ts(&[dummy])?;
            let sz = t.size();
            if sz != [1, 2] {
                return Err(ModelError::Schema(format!("unexpected model output size: {sz:?}")));
            }

            Ok(Self {
                model,
                device,
                vocab,
                in_dim,
            })
        }

        fn encode(&self, row: &ModelInput) -> Result<Vec<f32>, ModelError> {
            one_hot_row(&self.vocab, row)
        }
    }

    /// One-hot block per categorical column, in vocabulary order, then the
    /// six numerics in schema order.
    pub(super) fn one_hot_row(vocab: &[Vec<String>], row: &ModelInput) -> Result<Vec<f32>, ModelError> {
        let width = vocab.iter().map(Vec::len).sum::<usize>() + NUMERIC_COLUMNS.len();
        let mut x = Vec::with_capacity(width);
        for (column, values) in CATEGORICAL_COLUMNS.into_iter().zip(vocab) {
            let value = row.categorical(column).unwrap_or_default();
            let hot = values.iter().position(|v| v == value).ok_or_else(|| {
                ModelError::UnknownCategory {
                    column,
                    value: value.to_string(),
                }
            })?;
            x.extend((0..values.len()).map(|i| if i == hot { 1.0 } else { 0.0 }));
        }
        x.extend(row.numerics().iter().map(|v| *v as f32));
        Ok(x)
    }

    impl WinClassifier for TorchModel {
        fn predict_proba(&self, row: &ModelInput) -> Result<WinProbability, ModelError> {
            let x = self.encode(row)?;
            let input = Tensor::from_slice(&x)
                .reshape([1, self.in_dim as i64])
                .to_device(self.device);

            let probs = self.model.forward_ts(&[input])?.softmax(-1, Kind::Double);
            let win = probs.double_value(&[0, 1]);
            if !win.is_finite() {
                return Err(ModelError::InvalidOutput(format!("win probability {win}")));
            }
            Ok(WinProbability::from_win(win))
        }

        fn name(&self) -> &'static str {
            "torchscript"
        }
    }
}
