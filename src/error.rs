use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Category of a failed operation
///
/// Each kind maps onto one outcome of the HTTP surface: validation and parse
/// failures are the caller's fault, `NotFound` means the catalog had no rows,
/// and `DataAccess` covers everything the database driver reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    DataAccess,
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::DataAccess => "data_access",
            ErrorKind::Parse => "parse",
        };
        f.write_str(label)
    }
}

/// Error returned by every fallible operation in the crate
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataAccess, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message, keeping the kind
    pub fn context(self, prefix: &str) -> Self {
        AppError {
            kind: self.kind,
            message: format!("{}: {}", prefix, self.message),
        }
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        AppError::parse(format!("Failed to read spreadsheet: {}", e))
    }
}

#[cfg(feature = "web")]
impl From<oracle::Error> for AppError {
    fn from(e: oracle::Error) -> Self {
        AppError::data_access(e.to_string())
    }
}

#[cfg(feature = "web")]
impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::data_access(format!("Database task failed: {}", e))
    }
}

#[cfg(feature = "web")]
mod response {
    use super::{AppError, ErrorKind};
    use axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    };

    impl ErrorKind {
        pub fn status(self) -> StatusCode {
            match self {
                ErrorKind::Validation | ErrorKind::Parse => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::DataAccess => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let body = serde_json::json!({
                "error": self.message,
                "kind": self.kind,
            });
            (self.kind.status(), Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let err = AppError::data_access("ORA-00942: table or view does not exist").context("Failed to save");
        assert_eq!(err.kind(), ErrorKind::DataAccess);
        assert_eq!(
            err.to_string(),
            "Failed to save: ORA-00942: table or view does not exist"
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
        assert_eq!(ErrorKind::DataAccess.to_string(), "data_access");
    }

    #[cfg(feature = "web")]
    #[test]
    fn status_codes_follow_kind() {
        use axum::http::StatusCode;
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Parse.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::DataAccess.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
