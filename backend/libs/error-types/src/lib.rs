//! Shared error response types
//!
//! Every service endpoint reports failures with the same JSON envelope so
//! clients can branch on a stable machine-readable `code` while humans read
//! `message`. Services map their internal error enums onto this envelope in
//! their `error.rs`.

use serde::{Deserialize, Serialize};

/// Structured error envelope returned by all HTTP endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short status title, e.g. "Unauthorized"
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// HTTP status code, duplicated in the body for non-HTTP transports
    pub status: u16,
    /// Coarse error category, e.g. "authentication_error"
    pub error_type: String,
    /// Stable machine-readable code from [`error_codes`]
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
        }
    }
}

/// Stable error codes shared across the platform.
///
/// Codes are part of the public API contract: clients match on them, so an
/// existing code must never change meaning.
pub mod error_codes {
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const MISSING_REFRESH_TOKEN: &str = "MISSING_REFRESH_TOKEN";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const STALE_REFRESH_TOKEN: &str = "STALE_REFRESH_TOKEN";
    pub const ASSET_UPLOAD_FAILED: &str = "ASSET_UPLOAD_FAILED";
    pub const PERSIST_FAILED: &str = "PERSIST_FAILED";
    pub const RESOURCE_CONFLICT: &str = "RESOURCE_CONFLICT";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_all_fields() {
        let response = ErrorResponse::new(
            "Unauthorized",
            "Refresh token is no longer valid",
            401,
            "authentication_error",
            error_codes::STALE_REFRESH_TOKEN,
        );

        let json = serde_json::to_value(&response).expect("envelope should serialize");
        assert_eq!(json["status"], 401);
        assert_eq!(json["code"], "STALE_REFRESH_TOKEN");
        assert_eq!(json["error_type"], "authentication_error");
    }

    #[test]
    fn envelope_round_trips() {
        let response = ErrorResponse::new("Not Found", "video not found", 404, "not_found_error", error_codes::NOT_FOUND);
        let json = serde_json::to_string(&response).expect("serialize");
        let parsed: ErrorResponse = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.code, response.code);
        assert_eq!(parsed.message, response.message);
    }
}
