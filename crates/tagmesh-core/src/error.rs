use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, TagMeshError>;

#[derive(Debug, Error)]
pub enum TagMeshError {
    #[error("malformed tag: {0}")]
    MalformedTag(String),

    #[error("unknown tag family '{family}' in tag '{tag}'")]
    UnknownFamily { tag: String, family: String },

    #[error("tag family '{family}' allows {min}..={max} tags, got {observed}")]
    CardinalityViolation {
        family: String,
        min: usize,
        max: usize,
        observed: usize,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("graph capability is unavailable for this engine")]
    GraphUnavailable,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    FrontMatter(#[from] serde_norway::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl TagMeshError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedTag(_) => "MALFORMED_TAG",
            Self::UnknownFamily { .. } => "UNKNOWN_FAMILY",
            Self::CardinalityViolation { .. } => "CARDINALITY_VIOLATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::GraphUnavailable => "GRAPH_UNAVAILABLE",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::FrontMatter(_) => "FRONT_MATTER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Validation-family errors require the caller to change its input; retrying is pointless.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::NotFound(_))
    }

    pub fn to_payload(&self, operation: impl Into<String>, item_id: Option<String>) -> ErrorPayload {
        let details = match self {
            Self::CardinalityViolation {
                family,
                min,
                max,
                observed,
            } => Some(serde_json::json!({
                "family": family,
                "min": min,
                "max": max,
                "observed": observed,
            })),
            Self::UnknownFamily { tag, family } => Some(serde_json::json!({
                "tag": tag,
                "family": family,
            })),
            _ => None,
        };
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            item_id,
            details,
        }
    }
}
