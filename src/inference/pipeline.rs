use ndarray::Array2;
use std::collections::HashMap;
use std::sync::Arc;
use strum_macros::Display;

use crate::artifacts::ArtifactStore;
use crate::defaults;
use crate::error::{AppError, Result};
use crate::schema::{self, FieldKind, FormValue, OperationMode};

/// Stages of the per-request pipeline, in strict order. The only allowed
/// deviation is the early exit to the handler's error boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PipelineStage {
    VectorBuilding,
    Transform,
    Predict,
    Decode,
}

/// Build the ordered feature vector from submitted form fields.
///
/// Fields absent from the submission fall back to the stringified hardcoded
/// default (first mode choice for the categorical field). Each successfully
/// parsed field is recorded back into `form_values` before the next one is
/// touched, so on failure the form still redisplays everything that parsed.
pub fn build_feature_vector(
    form: &HashMap<String, String>,
    form_values: &mut HashMap<String, FormValue>,
) -> Result<Vec<f64>> {
    let fallback = defaults::fallback_defaults();
    let mut vector = Vec::with_capacity(schema::FEATURE_COUNT);

    for descriptor in schema::descriptors() {
        let raw = match form.get(descriptor.name) {
            Some(submitted) => submitted.clone(),
            None => match descriptor.kind {
                FieldKind::Categorical => OperationMode::choices()[0].to_string(),
                FieldKind::Numeric => fallback
                    .get(descriptor.name)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "0".to_string()),
            },
        };

        let value = descriptor.parse(&raw)?;
        vector.push(value);

        let recorded = match descriptor.kind {
            FieldKind::Categorical => FormValue::Text(raw),
            FieldKind::Numeric => FormValue::Float(value),
        };
        form_values.insert(descriptor.name.to_string(), recorded);
    }

    Ok(vector)
}

/// The per-request handler core, running the staged pipeline against the
/// process-wide artifacts.
pub struct InferencePipeline {
    store: Arc<ArtifactStore>,
}

impl InferencePipeline {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Run one submission through Vector-Building → Transform → Predict →
    /// Decode. Failures propagate to the caller, which owns the
    /// error-to-display-string boundary.
    pub fn run(
        &self,
        form: &HashMap<String, String>,
        form_values: &mut HashMap<String, FormValue>,
    ) -> Result<String> {
        tracing::debug!(stage = %PipelineStage::VectorBuilding, "Building feature vector");
        let vector = build_feature_vector(form, form_values)?;

        tracing::debug!(stage = %PipelineStage::Transform, "Scaling input row");
        let scaled = self.transform(vector)?;

        tracing::debug!(stage = %PipelineStage::Predict, "Running classifier");
        let class_index = self.predict(&scaled)?;

        tracing::debug!(stage = %PipelineStage::Decode, class_index, "Decoding label");
        Ok(schema::decode_label(class_index))
    }

    fn transform(&self, vector: Vec<f64>) -> Result<Array2<f64>> {
        let row = Array2::from_shape_vec((1, vector.len()), vector)
            .map_err(|e| AppError::Transform(e.to_string()))?;
        self.store.scaler.transform(&row)
    }

    fn predict(&self, scaled: &Array2<f64>) -> Result<usize> {
        let predictions = self.store.classifier.predict(scaled)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| AppError::Predict("classifier returned no prediction".to_string()))
    }
}
