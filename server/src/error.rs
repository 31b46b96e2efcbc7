//! Error taxonomies for the two request flows.
//!
//! Upload failures render as `{ "success": false, "error", "code" }` so the
//! frontend can keep checking `success`; paper lookup failures render as
//! `{ "error" }` like the rest of the lookup API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Everything that can go wrong between receiving an upload request and
/// handing back a receipt.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid data format")]
    InvalidDataFormat,

    #[error("Invalid tags format")]
    InvalidTagsFormat,

    /// `size_kib` is already formatted with two decimals.
    #[error("File too large: {size_kib} KB > {limit_kib} KB")]
    PayloadTooLarge { size_kib: String, limit_kib: String },

    #[error("{0} environment variable is required")]
    MissingCredential(String),

    #[error("Invalid wallet credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Upload failed: {0}")]
    Dispatch(String),

    /// The body could not be read or is not JSON.
    #[error("Malformed request body: {message}")]
    MalformedBody { status: StatusCode, message: String },

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::InvalidDataFormat
            | UploadError::InvalidTagsFormat
            | UploadError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            UploadError::MalformedBody { status, .. } => *status,
            UploadError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            UploadError::MissingCredential(_)
            | UploadError::InvalidCredential(_)
            | UploadError::InvalidTag(_)
            | UploadError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable identifier sent next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::InvalidDataFormat => "INVALID_DATA_FORMAT",
            UploadError::InvalidTagsFormat => "INVALID_TAGS_FORMAT",
            UploadError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            UploadError::MissingCredential(_) => "MISSING_CREDENTIAL",
            UploadError::InvalidCredential(_) => "INVALID_CREDENTIAL",
            UploadError::InvalidTag(_) | UploadError::Dispatch(_) => "UPLOAD_DISPATCH_FAILED",
            UploadError::MalformedBody { .. } => "MALFORMED_BODY",
            UploadError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Failures of `GET /api/paper-info`.
#[derive(Debug, thiserror::Error)]
pub enum PaperError {
    #[error("DOI parameter is required")]
    MissingDoi,

    #[error("Paper not found")]
    NotFound,

    #[error("Internal server error")]
    Upstream(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for PaperError {
    fn into_response(self) -> Response {
        match self {
            PaperError::MissingDoi => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            PaperError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            PaperError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            PaperError::Upstream(ref message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": self.to_string(), "message": message })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_too_large_message() {
        let err = UploadError::PayloadTooLarge {
            size_kib: "100.00".to_string(),
            limit_kib: "100".to_string(),
        };
        assert_eq!(err.to_string(), "File too large: 100.00 KB > 100 KB");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = UploadError::MissingCredential("PRIVATE_KEY".to_string());
        assert_eq!(err.to_string(), "PRIVATE_KEY environment variable is required");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "MISSING_CREDENTIAL");
    }

    #[test]
    fn test_shape_errors_are_client_errors() {
        assert_eq!(UploadError::InvalidDataFormat.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::InvalidTagsFormat.status(), StatusCode::BAD_REQUEST);
    }
}
