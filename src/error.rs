//! Typed failures that surface to the user

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The artifact bundle file does not exist
    #[error("Model artifacts not found at {0}. Export the trained bundle to this path first.")]
    ArtifactsMissing(PathBuf),

    /// The bundle exists but cannot be used
    #[error("Invalid artifact bundle: {0}")]
    InvalidArtifacts(String),

    /// The loader's source CSV does not exist
    #[error("Data file not found at {0}")]
    DataFileMissing(PathBuf),

    /// A categorical value outside the persisted vocabulary
    #[error("Column '{column}' contains previously unseen label '{value}'")]
    UnseenCategory { column: String, value: String },

    /// The bundle expects a feature the input record does not provide
    #[error("Feature '{0}' is not present in the input record")]
    MissingFeature(String),

    /// Vector lengths disagree between pipeline stages
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this is a missing-resource failure (fatal, halts rendering)
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            AppError::ArtifactsMissing(_) | AppError::DataFileMissing(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ArtifactsMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnseenCategory { .. }
            | AppError::MissingFeature(_)
            | AppError::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidArtifacts(_)
            | AppError::DataFileMissing(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
