/// Error types for platform-service
///
/// `AppError` is the full failure taxonomy of the service. Every variant maps
/// to an HTTP status plus a stable machine-readable code in the shared
/// `error-types` envelope. Post-commit cleanup failures are deliberately not
/// represented here: they are logged where they happen and never surfaced.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, ErrorResponse};
use thiserror::Error;

/// Result type for platform-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Password verifier mismatch on login
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Resource lookup failed
    #[error("{0} not found")]
    NotFound(String),

    /// Request lacks valid authentication
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requester is not the owner of the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Refresh request carried no token at all
    #[error("Refresh token is missing")]
    MissingToken,

    /// Token signature or expiry check failed
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Structurally valid refresh token that no longer matches the stored slot
    #[error("Refresh token has been superseded")]
    StaleToken,

    /// Object-store upload failed; the operation was aborted and compensated
    #[error("Asset upload failed: {0}")]
    AssetUploadFailed(String),

    /// Metadata write failed after a successful upload; staged assets removed
    #[error("Failed to persist record: {0}")]
    PersistFailed(String),

    /// Conflicting resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request payload failed a precondition check
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::Unauthorized(_)
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::StaleToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AssetUploadFailed(_)
            | AppError::PersistFailed(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = match self {
            AppError::InvalidCredentials => ("authentication_error", error_codes::INVALID_CREDENTIALS),
            AppError::NotFound(_) => ("not_found_error", error_codes::NOT_FOUND),
            AppError::Unauthorized(_) => ("authentication_error", error_codes::UNAUTHORIZED),
            AppError::Forbidden(_) => ("authorization_error", error_codes::FORBIDDEN),
            AppError::MissingToken => ("authentication_error", error_codes::MISSING_REFRESH_TOKEN),
            AppError::InvalidToken => ("authentication_error", error_codes::INVALID_TOKEN),
            AppError::StaleToken => ("authentication_error", error_codes::STALE_REFRESH_TOKEN),
            AppError::AssetUploadFailed(_) => ("server_error", error_codes::ASSET_UPLOAD_FAILED),
            AppError::PersistFailed(_) => ("server_error", error_codes::PERSIST_FAILED),
            AppError::Conflict(_) => ("conflict_error", error_codes::RESOURCE_CONFLICT),
            AppError::Validation(_) => ("validation_error", error_codes::VALIDATION_ERROR),
            AppError::Database(_) => ("server_error", error_codes::DATABASE_ERROR),
            AppError::Internal(_) => ("server_error", error_codes::INTERNAL_SERVER_ERROR),
        };

        let message = self.to_string();
        let response = ErrorResponse::new(
            match status {
                StatusCode::BAD_REQUEST => "Bad Request",
                StatusCode::UNAUTHORIZED => "Unauthorized",
                StatusCode::FORBIDDEN => "Forbidden",
                StatusCode::NOT_FOUND => "Not Found",
                StatusCode::CONFLICT => "Conflict",
                StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
                _ => "Error",
            },
            &message,
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        AppError::Database(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_err: jsonwebtoken::errors::Error) -> Self {
        AppError::InvalidToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_token_maps_to_unauthorized() {
        assert_eq!(AppError::StaleToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn persist_failure_is_a_server_error() {
        let err = AppError::PersistFailed("insert failed".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = AppError::Forbidden("not the owner".to_string());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
