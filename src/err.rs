use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

use serde::Serialize;
use thiserror::Error;

pub async fn handler404(path: Uri) -> Error {
    Error::NotFound {
        message: format!("Invalid path: {}", path),
    }
}

/// Successful JSON payload, rendered as `{"success": true, ..value}`.
#[derive(Debug, Clone, Serialize)]
pub struct Success<V> {
    success: bool,
    #[serde(flatten)]
    value: V,
}

impl<V: Serialize> Success<V> {
    pub fn of(value: V) -> Self {
        Self {
            success: true,
            value,
        }
    }
}

/// Every failure the portal can report. The `Display` text is what the end user sees, either
/// inside a page's error banner or as the `error` field of a JSON body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{message}")]
    InvalidPayload { message: String },
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{message}")]
    AuthenticationFailure { message: String },
    #[error("{message}")]
    UserAlreadyExists { message: String },
    #[error("A submission is already in progress")]
    SubmissionInProgress,
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    InternalError { kind: &'static str, message: String },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    pub fn invalid<S: Into<String>>(msg: S) -> Error {
        Error::InvalidPayload {
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidPayload { .. }
            | Error::AuthenticationFailure { .. }
            | Error::UserAlreadyExists { .. } => StatusCode::BAD_REQUEST,
            Error::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::SubmissionInProgress => StatusCode::CONFLICT,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::InternalError {
            kind: "DatabaseError",
            message: err.to_string(),
        }
    }
}

impl From<pbkdf2::password_hash::Error> for Error {
    fn from(err: pbkdf2::password_hash::Error) -> Self {
        Self::InternalError {
            kind: "HashError",
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError {
            kind: "Unknown",
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_variant() {
        assert_eq!(Error::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NotAuthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Error::SubmissionInProgress.status(), StatusCode::CONFLICT);
        let internal = Error::InternalError {
            kind: "DatabaseError",
            message: "relation does not exist".to_string(),
        };
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.to_string(), "relation does not exist");
    }

    #[test]
    fn success_flattens_its_value() {
        #[derive(Serialize)]
        struct Added {
            student_id: u32,
        }
        let json = serde_json::to_value(Success::of(Added { student_id: 7 })).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "student_id": 7}));
    }
}
