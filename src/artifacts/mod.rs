//! Process-wide model artifacts, loaded once at startup and shared
//! read-only across all requests.

pub mod classifier;
pub mod scaler;

pub use classifier::{calculate_metrics, ClassMetrics, MaintenanceClassifier, ModelMetrics};
pub use scaler::StandardScaler;

use crate::config::ArtifactConfig;
use crate::error::{AppError, Result};
use crate::schema::{self, OperationMode};

/// The loaded classifier and scaler. Both are required; a missing or
/// corrupt file fails startup with no recovery path.
#[derive(Debug)]
pub struct ArtifactStore {
    pub scaler: StandardScaler,
    pub classifier: MaintenanceClassifier,
}

impl ArtifactStore {
    /// Load both artifacts and verify their embedded tables against the
    /// compiled schema.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        let scaler = StandardScaler::load(&config.scaler_path)?;
        let classifier = MaintenanceClassifier::load(&config.model_path)?;

        let store = Self { scaler, classifier };
        store.verify_schema()?;

        tracing::info!(
            n_features = store.scaler.n_features(),
            n_training_samples = store.classifier.n_training_samples,
            trained_at = %store.classifier.trained_at,
            "Model artifacts loaded"
        );

        Ok(store)
    }

    /// Reject artifacts fit against a different feature order, label
    /// table, or mode encoding than this build compiles in.
    fn verify_schema(&self) -> Result<()> {
        if !self
            .scaler
            .feature_names
            .iter()
            .map(String::as_str)
            .eq(schema::FEATURES.iter().copied())
        {
            return Err(AppError::Artifact(format!(
                "scaler was fit on a different feature schema: {:?}",
                self.scaler.feature_names
            )));
        }

        if self.scaler.n_features() != schema::FEATURE_COUNT
            || self.classifier.n_features != schema::FEATURE_COUNT
        {
            return Err(AppError::Artifact(format!(
                "artifacts expect {} features, schema defines {}",
                self.classifier.n_features,
                schema::FEATURE_COUNT
            )));
        }

        if !self
            .classifier
            .labels
            .iter()
            .map(String::as_str)
            .eq(schema::LABELS.iter().copied())
        {
            return Err(AppError::Artifact(format!(
                "model was trained with a different label table: {:?}",
                self.classifier.labels
            )));
        }

        if !self
            .classifier
            .operation_modes
            .iter()
            .map(String::as_str)
            .eq(OperationMode::choices())
        {
            return Err(AppError::Artifact(format!(
                "model was trained with a different operation-mode table: {:?}",
                self.classifier.operation_modes
            )));
        }

        Ok(())
    }
}
