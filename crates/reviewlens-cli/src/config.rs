//! Application configuration

use crate::cli::ModelArgs;
use reviewlens_classifiers::{ClassifierConfig, PromptTemplate};
use reviewlens_pipeline::{PipelineConfig, ValidationConfig};
use reviewlens_telemetry::DriftConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration file (`reviewlens.yaml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model, backend and retry settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Drift monitor settings
    #[serde(default)]
    pub drift: DriftConfig,

    /// Batch labelling settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Validation sampling settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl AppConfig {
    /// Load configuration from file, or use defaults if the file is absent
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply model-related CLI overrides
    pub fn apply_model_args(&mut self, args: &ModelArgs) {
        if let Some(model) = &args.model {
            self.classifier.model = model.clone();
        }
        if args.few_shot {
            self.classifier.prompt = PromptTemplate::FewShot;
        }
    }

    /// Check every section
    pub fn validate(&self) -> reviewlens_core::Result<()> {
        self.classifier.validate()?;
        self.drift.validate()?;
        self.pipeline.validate()?;
        self.validation.validate()?;
        Ok(())
    }
}
