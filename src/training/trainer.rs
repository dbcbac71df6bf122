use std::path::{Path, PathBuf};

use crate::artifacts::MaintenanceClassifier;
use crate::error::Result;
use crate::training::ProcessedDataset;

/// Pipeline stage 2: classifier training, held-out evaluation, and
/// artifact persistence.
pub struct ModelTraining {
    model_output_path: PathBuf,
    max_depth: u16,
}

impl ModelTraining {
    pub fn new(model_output_path: &Path) -> Self {
        Self {
            model_output_path: model_output_path.to_path_buf(),
            max_depth: 10,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Train on the processed splits, log held-out metrics, and persist
    /// the model artifact.
    pub fn run(&self, dataset: &ProcessedDataset) -> Result<MaintenanceClassifier> {
        tracing::info!(
            n_samples = dataset.train.features.nrows(),
            max_depth = self.max_depth,
            "Training decision-tree classifier"
        );

        let classifier = MaintenanceClassifier::train(
            &dataset.train.features,
            &dataset.train.labels,
            self.max_depth,
        )?;

        let metrics = classifier.evaluate(&dataset.test.features, &dataset.test.labels)?;
        tracing::info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1_score = metrics.f1_score,
            "Held-out evaluation"
        );

        let model_path = self.model_output_path.join("model.bin");
        classifier.save(&model_path)?;
        tracing::info!(path = %model_path.display(), "Model saved");

        Ok(classifier)
    }
}
