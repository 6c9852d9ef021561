use anyhow::{bail, Context, Result};
use std::{net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc};

use crate::model::{LogisticPipeline, WinClassifier};

/// Which backend reads the model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Logistic,
    TorchScript,
}

impl FromStr for ModelKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logistic" => Ok(ModelKind::Logistic),
            "torchscript" | "torch" => Ok(ModelKind::TorchScript),
            other => bail!("unknown MODEL_KIND {other:?} (expected logistic or torchscript)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub model_kind: ModelKind,
    pub meta_path: Option<PathBuf>,
    pub addr: SocketAddr,
    /// Log every derived feature row at info.
    pub log_features: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let model_path = get("MODEL_PATH").unwrap_or_else(|| "models/pipe.json".to_string());
        let model_kind = match get("MODEL_KIND") {
            Some(kind) => kind.parse::<ModelKind>()?,
            None => ModelKind::Logistic,
        };
        let meta_path = get("META_PATH").map(PathBuf::from);
        if model_kind == ModelKind::TorchScript && meta_path.is_none() {
            bail!("META_PATH must be set when MODEL_KIND=torchscript");
        }

        let host = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = match get("PORT") {
            Some(p) => p.parse().with_context(|| format!("invalid PORT {p:?}"))?,
            None => 8080,
        };
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid BIND_ADDR {host:?}"))?;

        Ok(Self {
            model_path: PathBuf::from(model_path),
            model_kind,
            meta_path,
            addr,
            log_features: get("LOG_PRED").as_deref() == Some("1"),
        })
    }

    /// Loads the classifier named by this config. Called once at startup.
    pub fn load_model(&self) -> Result<Arc<dyn WinClassifier>> {
        match self.model_kind {
            ModelKind::Logistic => {
                let model = LogisticPipeline::load(&self.model_path)
                    .with_context(|| format!("failed to load model {}", self.model_path.display()))?;
                Ok(Arc::new(model))
            }
            #[cfg(feature = "torch")]
            ModelKind::TorchScript => {
                let meta_path = self.meta_path.as_deref().context("META_PATH not set")?;
                let model = crate::model::TorchModel::new(&self.model_path, meta_path)
                    .with_context(|| format!("failed to load TorchScript {}", self.model_path.display()))?;
                Ok(Arc::new(model))
            }
            #[cfg(not(feature = "torch"))]
            ModelKind::TorchScript => bail!("MODEL_KIND=torchscript requires building with --features torch"),
        }
    }
}
