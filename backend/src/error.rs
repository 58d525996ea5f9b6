use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Message returned for every token failure, known-but-cleared and never-issued alike
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or missing token";

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Missing, malformed or unknown bearer token
    #[error("{}", INVALID_TOKEN_MESSAGE)]
    Unauthenticated,

    /// Ingestion input is structurally unusable
    #[error("{0}")]
    Ingest(#[from] IngestError),

    /// Duplicate record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// File system errors (link manifests, CSV input)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Unauthenticated => 400,
            AppError::Validation(_) => 400,
            AppError::Ingest(IngestError::Format(_)) => 400,
            AppError::Ingest(IngestError::SlugCollision { .. }) | AppError::Conflict(_) => 409,
            AppError::Config(_) => 500,
            AppError::Database(_) | AppError::Sqlx(_) => 500,
            _ => 500,
        }
    }

    /// Message safe to show to a caller; internal failures collapse to a generic string
    pub fn public_message(&self) -> String {
        if self.status_code() >= 500 {
            "Internal server error".to_string()
        } else {
            match self {
                AppError::NotFound(msg) | AppError::Validation(msg) | AppError::Conflict(msg) => {
                    msg.clone()
                }
                other => other.to_string(),
            }
        }
    }
}

/// Fatal ingestion failures; nothing is written when one of these is raised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The CSV cannot be used at all (too few lines, bad header, no valid pairs)
    #[error("CSV format error: {0}")]
    Format(String),

    /// Two distinct names in one run produce the same member slug
    #[error("Names {first:?} and {second:?} both produce slug {slug:?}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type alias for store operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => AppError::Conflict(msg),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if code.as_deref() == Some("23503") {
                    // Foreign key violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else if code.as_deref() == Some("23514") {
                    // Check constraint violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthenticated.status_code(), 400);
        assert_eq!(AppError::NotFound("Family not found".into()).status_code(), 404);
        assert_eq!(AppError::Validation("bad".into()).status_code(), 400);
        assert_eq!(
            AppError::Ingest(IngestError::Format("empty".into())).status_code(),
            400
        );
        assert_eq!(
            AppError::Ingest(IngestError::SlugCollision {
                slug: "ana".into(),
                first: "Ana".into(),
                second: "ANA".into(),
            })
            .status_code(),
            409
        );
        assert_eq!(AppError::Sqlx(SqlxError::PoolClosed).status_code(), 500);
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let err = AppError::Message("connection refused to 10.0.0.3".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::NotFound("Member not found".into());
        assert_eq!(err.public_message(), "Member not found");

        assert_eq!(AppError::Unauthenticated.public_message(), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: AppError = RepositoryError::Duplicate("members_family_slug_key".into()).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = RepositoryError::NotFound("gone".into()).into();
        assert!(err.is_not_found());

        let err: AppError = RepositoryError::ConstraintViolation("members_family_id_fkey".into()).into();
        assert_eq!(err.status_code(), 400);
    }
}
