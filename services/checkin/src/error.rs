use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::CheckinDetails;

/// Check-in service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CheckinServiceError {
    #[error("invalid verification code")]
    InvalidToken,
    #[error("verification code already used")]
    AlreadyConsumed(Box<CheckinDetails>),
    #[error("verification code superseded")]
    Expired(Box<CheckinDetails>),
    #[error("target not found")]
    TargetNotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CheckinServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::AlreadyConsumed(_) => "ALREADY_CONSUMED",
            Self::Expired(_) => "EXPIRED",
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Token data shown alongside rejected scans.
    pub fn details(&self) -> Option<&CheckinDetails> {
        match self {
            Self::AlreadyConsumed(details) | Self::Expired(details) => Some(&**details),
            _ => None,
        }
    }
}

impl IntoResponse for CheckinServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidToken | Self::TargetNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyConsumed(_) => StatusCode::CONFLICT,
            Self::Expired(_) => StatusCode::GONE,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 500s are logged; the trace layer already records every response status.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(details) = self.details().and_then(|d| serde_json::to_value(d).ok()) {
            body["details"] = details;
        }
        (status, axum::Json(body)).into_response()
    }
}
