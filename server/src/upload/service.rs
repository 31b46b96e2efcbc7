//! The upload pipeline and its HTTP handler.
//!
//! POST /api/irys/upload with body `{ "data": number[], "tags": {name, value}[] }`

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::UploadError;
use crate::state::AppState;
use crate::upload::request::{format_kib, format_limit_kib, UploadRequest};
use crate::upload::session::UploaderSession;
use crate::upload::uploader::Tag;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub tx_id: String,
    pub url: String,
    pub size: usize,
    pub tags: Vec<Value>,
}

/// Validate, size-gate and forward uploads to the shared uploader.
pub struct UploadService {
    session: UploaderSession,
    max_size_bytes: usize,
    gateway_url: String,
}

impl UploadService {
    pub fn new(session: UploaderSession, max_size_bytes: usize, gateway_url: &str) -> Self {
        Self {
            session,
            max_size_bytes,
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn session(&self) -> &UploaderSession {
        &self.session
    }

    /// Run one upload request from parsed JSON body to receipt.
    pub async fn handle(&self, body: &Value) -> Result<UploadResponse, UploadError> {
        let request = UploadRequest::from_json(body)?;
        let size = request.data.len();

        if size > self.max_size_bytes {
            tracing::warn!(
                "Rejected upload of {} bytes ({} KB), limit is {} bytes",
                size,
                format_kib(size),
                self.max_size_bytes
            );
            return Err(UploadError::PayloadTooLarge {
                size_kib: format_kib(size),
                limit_kib: format_limit_kib(self.max_size_bytes),
            });
        }

        tracing::info!("Uploading file: {} bytes ({} KB)", size, format_kib(size));

        match self.dispatch(&request).await {
            Ok(tx_id) => {
                let url = format!("{}/{}", self.gateway_url, tx_id);
                tracing::info!("Upload successful: {}", url);
                Ok(UploadResponse {
                    success: true,
                    tx_id,
                    url,
                    size,
                    tags: request.tags,
                })
            }
            Err(e) => {
                tracing::error!("Upload failed: {}", e);
                Err(e)
            }
        }
    }

    async fn dispatch(&self, request: &UploadRequest) -> Result<String, UploadError> {
        let uploader = self.session.get().await?;
        let tags = request
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| Tag::from_json(i, tag))
            .collect::<Result<Vec<_>, _>>()?;
        let receipt = uploader.upload(&request.data, &tags).await?;
        Ok(receipt.id)
    }
}

/// POST /api/irys/upload
///
/// The body is read as raw bytes so a missing or wrong Content-Type still
/// reaches shape validation instead of failing in the extractor.
pub async fn upload(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    let body = body.map_err(|rejection| UploadError::MalformedBody {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;

    let body: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body).map_err(|e| UploadError::MalformedBody {
            status: axum::http::StatusCode::BAD_REQUEST,
            message: e.to_string(),
        })?
    };

    state.upload.handle(&body).await.map(Json)
}

/// Fallback for any method other than POST on the upload route.
pub async fn method_not_allowed() -> UploadError {
    UploadError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::uploader::{UploadReceipt, Uploader, UploaderFactory};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Uploader returning a fixed id and remembering what it was given.
    #[derive(Default)]
    struct StubUploader {
        seen: Mutex<Vec<(Vec<u8>, Vec<Tag>)>>,
    }

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload(&self, data: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError> {
            self.seen.lock().unwrap().push((data.to_vec(), tags.to_vec()));
            Ok(UploadReceipt { id: "X".to_string() })
        }
    }

    struct StubFactory(Arc<StubUploader>);

    #[async_trait]
    impl UploaderFactory for StubFactory {
        async fn connect(&self) -> Result<Arc<dyn Uploader>, UploadError> {
            Ok(self.0.clone())
        }
    }

    struct NoCredentialFactory;

    #[async_trait]
    impl UploaderFactory for NoCredentialFactory {
        async fn connect(&self) -> Result<Arc<dyn Uploader>, UploadError> {
            Err(UploadError::MissingCredential("PRIVATE_KEY".to_string()))
        }
    }

    fn service(max: usize) -> (UploadService, Arc<StubUploader>) {
        let stub = Arc::new(StubUploader::default());
        let session = UploaderSession::new(Arc::new(StubFactory(stub.clone())));
        (
            UploadService::new(session, max, "https://gateway.irys.xyz/"),
            stub,
        )
    }

    #[tokio::test]
    async fn test_hello_round_trip() {
        let (service, stub) = service(100 * 1024);
        let tags = json!([{ "name": "Content-Type", "value": "text/plain" }]);
        let resp = service
            .handle(&json!({ "data": [72, 101, 108, 108, 111], "tags": tags }))
            .await
            .unwrap();

        assert!(resp.success);
        assert_eq!(resp.tx_id, "X");
        assert_eq!(resp.url, "https://gateway.irys.xyz/X");
        assert_eq!(resp.size, 5);
        assert_eq!(Value::Array(resp.tags), tags);

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].0, b"Hello");
        assert_eq!(seen[0].1, vec![Tag::new("Content-Type", "text/plain")]);
    }

    #[tokio::test]
    async fn test_size_gate_boundary() {
        let (service, _) = service(8);
        let at_limit = json!({ "data": vec![0u8; 8], "tags": [] });
        assert!(service.handle(&at_limit).await.is_ok());

        let over = json!({ "data": vec![0u8; 9], "tags": [] });
        let err = service.handle(&over).await.unwrap_err();
        match err {
            UploadError::PayloadTooLarge { size_kib, .. } => assert_eq!(size_kib, "0.01"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_size_gate_runs_before_uploader_construction() {
        let session = UploaderSession::new(Arc::new(NoCredentialFactory));
        let service = UploadService::new(session, 1, "https://gateway.irys.xyz");
        let err = service
            .handle(&json!({ "data": [1, 2], "tags": [] }))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::PayloadTooLarge { .. }));
        assert!(!service.session().is_ready());
    }

    #[tokio::test]
    async fn test_missing_credential_surfaces_as_failure() {
        let session = UploaderSession::new(Arc::new(NoCredentialFactory));
        let service = UploadService::new(session, 1024, "https://gateway.irys.xyz");
        let err = service
            .handle(&json!({ "data": [1], "tags": [] }))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_malformed_tag_fails_dispatch() {
        let (service, stub) = service(1024);
        let err = service
            .handle(&json!({ "data": [1], "tags": [{ "name": "only-name" }] }))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidTag(_)));
        assert!(stub.seen.lock().unwrap().is_empty());
    }
}
