use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// A single failed field check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    /// Absent, or owned by somebody else.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A scoped update or delete touched zero rows.
    #[error("Not found: {0}")]
    NoRowAffected(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::DuplicateKey(
                    db.constraint()
                        .map(|c| format!("unique constraint {c} violated"))
                        .unwrap_or_else(|| db.message().to_string()),
                );
            }
        }
        AppError::Database(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::NoRowAffected(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) | AppError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DuplicateKey(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                json!({ "error": { "message": "Internal server error", "code": status.as_u16() } })
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                json!({ "error": { "message": "Internal server error", "code": status.as_u16() } })
            }
            AppError::Validation(violations) => json!({
                "error": {
                    "message": self.to_string(),
                    "code": status.as_u16(),
                    "details": violations,
                }
            }),
            _ => json!({ "error": { "message": self.to_string(), "code": status.as_u16() } }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_no_row_affected_are_both_404() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NoRowAffected("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_failures_hide_details() {
        let resp = AppError::Internal(anyhow::anyhow!("secret")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_unique_sqlx_errors_stay_database_errors() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
