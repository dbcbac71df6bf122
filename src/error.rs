use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Submitted operation-mode label outside the known set
    #[error("Unknown Operation_Mode '{0}'.")]
    UnknownOperationMode(String),

    /// A numeric form field could not be converted
    #[error("Invalid {field}: {source}")]
    Parse {
        field: String,
        source: std::num::ParseFloatError,
    },

    /// The scaler rejected the input row
    #[error("Scaler error: {0}")]
    Transform(String),

    /// The classifier rejected the scaled row
    #[error("Prediction error: {0}")]
    Predict(String),

    /// Missing or corrupt model/scaler artifact
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed or unusable training data
    #[error("Training data error: {0}")]
    TrainingData(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnknownOperationMode(_) => StatusCode::BAD_REQUEST,
            AppError::Parse { .. } => StatusCode::BAD_REQUEST,
            AppError::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Predict(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TrainingData(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::UnknownOperationMode(_) => "UNKNOWN_OPERATION_MODE",
            AppError::Parse { .. } => "PARSE_ERROR",
            AppError::Transform(_) => "TRANSFORM_ERROR",
            AppError::Predict(_) => "PREDICT_ERROR",
            AppError::Artifact(_) => "ARTIFACT_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::TrainingData(_) => "TRAINING_DATA_ERROR",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = status.as_u16(),
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from bincode::Error
impl From<bincode::Error> for AppError {
    fn from(err: bincode::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
