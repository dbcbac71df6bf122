use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::schema::{self, OperationMode};

/// Maintenance-urgency classifier: a decision tree over scaled telemetry.
///
/// The artifact embeds the label and operation-mode tables it was trained
/// against; `ArtifactStore::load` compares them to the compiled schema.
#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceClassifier {
    /// Trained model
    tree: DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,

    /// Class labels in output-index order
    pub labels: Vec<String>,

    /// Operation-mode labels in code order
    pub operation_modes: Vec<String>,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples
    pub n_training_samples: usize,

    /// Number of features
    pub n_features: usize,
}

impl MaintenanceClassifier {
    /// Train a decision tree on the scaled training split.
    pub fn train(features: &Array2<f64>, labels: &[usize], max_depth: u16) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(AppError::TrainingData(format!(
                "{} samples but {} labels",
                features.nrows(),
                labels.len()
            )));
        }

        let x = ndarray_to_densematrix(features);
        let y: Vec<i32> = labels.iter().map(|&l| l as i32).collect();

        let params = DecisionTreeClassifierParameters::default()
            .with_max_depth(max_depth)
            .with_criterion(SplitCriterion::Gini);

        let tree = DecisionTreeClassifier::fit(&x, &y, params)
            .map_err(|e| AppError::TrainingData(format!("failed to train decision tree: {}", e)))?;

        Ok(Self {
            tree,
            labels: schema::LABELS.iter().map(|l| l.to_string()).collect(),
            operation_modes: OperationMode::choices()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            trained_at: chrono::Utc::now(),
            n_training_samples: features.nrows(),
            n_features: features.ncols(),
        })
    }

    /// Predict class indices for each row of a scaled matrix.
    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let x = ndarray_to_densematrix(features);
        let predictions = self
            .tree
            .predict(&x)
            .map_err(|e| AppError::Predict(e.to_string()))?;

        Ok(predictions.iter().map(|&p| p as usize).collect())
    }

    /// Evaluate against a held-out split.
    pub fn evaluate(&self, features: &Array2<f64>, labels: &[usize]) -> Result<ModelMetrics> {
        let predictions = self.predict(features)?;
        Ok(calculate_metrics(labels, &predictions, self.labels.len()))
    }

    /// Persist the classifier with bincode.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a classifier previously written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::Artifact(format!("cannot open model at {}: {}", path.display(), e))
        })?;
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            AppError::Artifact(format!("corrupt model at {}: {}", path.display(), e))
        })
    }
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

/// Model evaluation metrics (macro-averaged)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Accuracy
    pub accuracy: f64,

    /// Precision
    pub precision: f64,

    /// Recall
    pub recall: f64,

    /// F1 score
    pub f1_score: f64,

    /// Per-class metrics
    pub per_class_metrics: HashMap<String, ClassMetrics>,
}

/// Per-class evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Calculate accuracy plus macro-averaged precision/recall/F1.
pub fn calculate_metrics(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> ModelMetrics {
    let n_samples = y_true.len();
    if n_samples == 0 {
        return ModelMetrics {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            per_class_metrics: HashMap::new(),
        };
    }

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    let accuracy = correct as f64 / n_samples as f64;

    let mut per_class = HashMap::new();

    for class_idx in 0..n_classes {
        let tp = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| **t == class_idx && **p == class_idx)
            .count();

        let fp = y_pred
            .iter()
            .zip(y_true.iter())
            .filter(|(p, t)| **p == class_idx && **t != class_idx)
            .count();

        let fn_count = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| **t == class_idx && **p != class_idx)
            .count();

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };

        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            0.0
        };

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let support = y_true.iter().filter(|&&t| t == class_idx).count();

        per_class.insert(
            schema::decode_label(class_idx),
            ClassMetrics {
                precision,
                recall,
                f1_score: f1,
                support,
            },
        );
    }

    let avg_precision: f64 =
        per_class.values().map(|m| m.precision).sum::<f64>() / n_classes as f64;
    let avg_recall: f64 = per_class.values().map(|m| m.recall).sum::<f64>() / n_classes as f64;
    let avg_f1: f64 = per_class.values().map(|m| m.f1_score).sum::<f64>() / n_classes as f64;

    ModelMetrics {
        accuracy,
        precision: avg_precision,
        recall: avg_recall,
        f1_score: avg_f1,
        per_class_metrics: per_class,
    }
}
