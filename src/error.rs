//! Error types for Paceline

use thiserror::Error;

/// Errors that can occur during evaluation or plan generation.
///
/// Missing history and unparseable sample values are not errors; they have
/// defined neutral defaults and per-sample skips. This enum covers the cases
/// that genuinely cannot produce a computed result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("behavior data source unavailable: {0}")]
    Upstream(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid plan template: {0}")]
    InvalidTemplate(String),
}
