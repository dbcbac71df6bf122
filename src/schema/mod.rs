//! Fixed feature schema and encoding tables for the trained model.
//!
//! The feature order, the operation-mode codes, and the class-label order
//! must exactly match what the training pipeline produced. There is no way
//! to recover from drift at request time, so the artifacts embed copies of
//! these tables and `ArtifactStore::load` verifies them at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{AppError, Result};

/// Number of model input features.
pub const FEATURE_COUNT: usize = 14;

/// Canonical feature order used when the scaler and model were fit.
pub const FEATURES: [&str; FEATURE_COUNT] = [
    "Operation_Mode",
    "Temperature_C",
    "Vibration_Hz",
    "Power_Consumption_kW",
    "Network_Latency_ms",
    "Packet_Loss_%",
    "Quality_Control_Defect_Rate_%",
    "Production_Speed_units_per_hr",
    "Predictive_Maintenance_Score",
    "Error_Rate_%",
    "Year",
    "Month",
    "Day",
    "Hour",
];

/// Maintenance-urgency class labels in model output-index order.
pub const LABELS: [&str; 3] = ["High", "Low", "Medium"];

/// How a form field is parsed into its vector slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free-text field parsed as f64
    Numeric,

    /// Closed label set mapped through the operation-mode table
    Categorical,
}

/// One slot of the input vector: its form-field name and parse rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Parse a raw form value into this slot's numeric representation.
    pub fn parse(&self, raw: &str) -> Result<f64> {
        match self.kind {
            FieldKind::Categorical => {
                let mode = OperationMode::from_str(raw)
                    .map_err(|_| AppError::UnknownOperationMode(raw.to_string()))?;
                Ok(f64::from(mode.encode()))
            }
            FieldKind::Numeric => raw.trim().parse::<f64>().map_err(|source| AppError::Parse {
                field: self.name.to_string(),
                source,
            }),
        }
    }
}

/// Field descriptors in canonical vector order.
pub fn descriptors() -> [FieldDescriptor; FEATURE_COUNT] {
    FEATURES.map(|name| FieldDescriptor {
        name,
        kind: if name == "Operation_Mode" {
            FieldKind::Categorical
        } else {
            FieldKind::Numeric
        },
    })
}

/// Machine operation mode, with the integer encoding used during training.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum OperationMode {
    Idle,
    Active,
    Maintenance,
}

impl OperationMode {
    /// Integer code fed into the feature vector.
    pub fn encode(self) -> u8 {
        match self {
            OperationMode::Idle => 0,
            OperationMode::Active => 1,
            OperationMode::Maintenance => 2,
        }
    }

    /// Labels in code order, as offered by the form. The first entry is the
    /// default when the field is absent from a submission.
    pub fn choices() -> Vec<&'static str> {
        Self::iter().map(<&'static str>::from).collect()
    }
}

/// Decode a predicted class index into its display label.
///
/// Unknown indices render as a synthesized string rather than failing.
pub fn decode_label(index: usize) -> String {
    LABELS
        .get(index)
        .map(|label| (*label).to_string())
        .unwrap_or_else(|| format!("Unknown ({})", index))
}

/// A resolved default or submitted value for one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Float(v) => write!(f, "{}", v),
            FormValue::Int(v) => write!(f, "{}", v),
            FormValue::Text(v) => write!(f, "{}", v),
        }
    }
}
