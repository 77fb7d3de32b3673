use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use albaran_domain::schema::SchemaError;

/// Record kinds named in error kinds and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Company,
    Client,
    Project,
    Albaran,
}

impl Resource {
    fn upper(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Company => "COMPANY",
            Self::Client => "CLIENT",
            Self::Project => "PROJECT",
            Self::Albaran => "ALBARAN",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Company => "company",
            Self::Client => "client",
            Self::Project => "project",
            Self::Albaran => "albaran",
        })
    }
}

/// API error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("start date must be before end date")]
    DateRange,
    #[error("a {entity} with {field} {value} already exists")]
    Duplicate {
        entity: Resource,
        field: &'static str,
        value: String,
    },
    #[error("{0} not found")]
    NotFound(Resource),
    #[error("user {0} does not exist")]
    UnknownUser(String),
    #[error("{0} is inactive")]
    Inactive(Resource),
    #[error("you do not have permission to access this {0}")]
    Forbidden(Resource),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user {0} has not been validated")]
    Unvalidated(String),
    #[error("invalid or expired validation code")]
    InvalidCode,
    #[error("user is already validated")]
    AlreadyValidated,
    #[error("albaran is already signed")]
    Locked,
    #[error("albaran is cancelled")]
    Cancelled,
    #[error("{0}")]
    Precondition(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<SchemaError> for ApiError {
    fn from(e: SchemaError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl ApiError {
    pub fn kind(&self) -> String {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR".into(),
            Self::DateRange => "DATE_RANGE_ERROR".into(),
            Self::Duplicate { .. } => "DUPLICATE".into(),
            Self::NotFound(r) => format!("{}_NOT_FOUND", r.upper()),
            Self::UnknownUser(_) => "USER_NOT_FOUND".into(),
            Self::Inactive(r) => format!("{}_INACTIVE", r.upper()),
            Self::Forbidden(_) => "FORBIDDEN".into(),
            Self::InvalidCredentials => "INVALID_CREDENTIALS".into(),
            Self::Unvalidated(_) => "USER_NOT_VALIDATED".into(),
            Self::InvalidCode => "INVALID_VALIDATION_CODE".into(),
            Self::AlreadyValidated => "ALREADY_VALIDATED".into(),
            Self::Locked => "ALBARAN_SIGNED".into(),
            Self::Cancelled => "ALBARAN_CANCELLED".into(),
            Self::Precondition(_) => "PRECONDITION_FAILED".into(),
            Self::Internal(_) => "INTERNAL".into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::DateRange
            | Self::Inactive(_)
            | Self::Unvalidated(_)
            | Self::InvalidCode
            | Self::AlreadyValidated
            | Self::Locked
            | Self::Cancelled
            | Self::Precondition(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) | Self::UnknownUser(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer records status for every request; only 500s carry detail worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
