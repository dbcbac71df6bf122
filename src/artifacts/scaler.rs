use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{AppError, Result};

/// Pre-fitted per-column z-score scaler.
///
/// Carries the feature names it was fit with so the loader can refuse
/// artifacts produced against a different schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Feature names in fit order
    pub feature_names: Vec<String>,

    /// Per-column means
    pub means: Vec<f64>,

    /// Per-column standard deviations, floored away from zero
    pub stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-column mean and standard deviation on the training matrix.
    pub fn fit(feature_names: &[&str], features: &Array2<f64>) -> Result<Self> {
        let (n_samples, n_features) = features.dim();

        if n_samples == 0 {
            return Err(AppError::TrainingData(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        if feature_names.len() != n_features {
            return Err(AppError::TrainingData(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                n_features
            )));
        }

        let n = n_samples as f64;
        let mut means = Vec::with_capacity(n_features);
        let mut stds = Vec::with_capacity(n_features);

        for col in 0..n_features {
            let column = features.column(col);
            let mean = column.sum() / n;
            let variance = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            means.push(mean);
            // Floor on std so constant columns transform to zero, not infinity
            stds.push(variance.sqrt().max(1e-8));
        }

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            means,
            stds,
        })
    }

    /// Standardize a matrix fitted-column by fitted-column.
    pub fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let (_, n_features) = features.dim();
        if n_features != self.means.len() {
            return Err(AppError::Transform(format!(
                "expected {} features, got {}",
                self.means.len(),
                n_features
            )));
        }

        let mut scaled = features.clone();
        for ((_, col), value) in scaled.indexed_iter_mut() {
            *value = (*value - self.means[col]) / self.stds[col];
        }
        Ok(scaled)
    }

    /// Number of columns this scaler was fit on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Persist the scaler with bincode.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a scaler previously written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::Artifact(format!("cannot open scaler at {}: {}", path.display(), e))
        })?;
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            AppError::Artifact(format!("corrupt scaler at {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let features = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(&["a", "b"], &features).unwrap();

        let scaled = scaler.transform(&features).unwrap();
        for col in 0..2 {
            let column = scaled.column(col);
            let mean = column.sum() / 3.0;
            assert!(mean.abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_column_transforms_to_zero() {
        let features = array![[5.0], [5.0], [5.0]];
        let scaler = StandardScaler::fit(&["c"], &features).unwrap();

        let scaled = scaler.transform(&features).unwrap();
        for value in scaled.iter() {
            assert!(value.abs() < 1e-6);
        }
    }

    #[test]
    fn test_transform_rejects_width_mismatch() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = StandardScaler::fit(&["a", "b"], &features).unwrap();

        let narrow = array![[1.0]];
        let err = scaler.transform(&narrow).unwrap_err();
        assert!(err.to_string().contains("expected 2 features, got 1"));
    }

    #[test]
    fn test_fit_rejects_empty_matrix() {
        let features = Array2::<f64>::zeros((0, 2));
        assert!(StandardScaler::fit(&["a", "b"], &features).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let features = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(&["a", "b"], &features).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.bin");
        scaler.save(&path).unwrap();

        let loaded = StandardScaler::load(&path).unwrap();
        assert_eq!(loaded.feature_names, scaler.feature_names);
        assert_eq!(loaded.means, scaler.means);
        assert_eq!(loaded.stds, scaler.stds);
    }

    #[test]
    fn test_load_missing_file_is_artifact_error() {
        let err = StandardScaler::load(Path::new("/nonexistent/scaler.bin")).unwrap_err();
        assert_eq!(err.error_code(), "ARTIFACT_ERROR");
    }
}
