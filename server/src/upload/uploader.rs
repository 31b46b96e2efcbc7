use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UploadError;

/// A name/value metadata pair attached to an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Read a tag from the raw JSON the client sent.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, UploadError> {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    UploadError::InvalidTag(format!("tag {} has no string `{}`", index, key))
                })
        };
        Ok(Self {
            name: field("name")?,
            value: field("value")?,
        })
    }
}

/// Receipt for a committed upload. The id is opaque to this server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
}

/// A connected upload client.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, data: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError>;
}

/// Builds an [`Uploader`] from process configuration.
///
/// Called by [`crate::upload::UploaderSession`] until one call succeeds.
#[async_trait]
pub trait UploaderFactory: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn Uploader>, UploadError>;
}

/// Development uploader that never touches the network.
#[derive(Debug, Default)]
pub struct MockUploader;

#[async_trait]
impl Uploader for MockUploader {
    async fn upload(&self, data: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError> {
        let id = mock_tx_id();
        tracing::debug!(
            "Mock upload of {} bytes with {} tags -> {}",
            data.len(),
            tags.len(),
            id
        );
        Ok(UploadReceipt { id })
    }
}

#[derive(Debug, Default)]
pub struct MockUploaderFactory;

#[async_trait]
impl UploaderFactory for MockUploaderFactory {
    async fn connect(&self) -> Result<Arc<dyn Uploader>, UploadError> {
        tracing::warn!("Using mock uploader, nothing will reach the Irys network");
        Ok(Arc::new(MockUploader))
    }
}

/// `irys_mock_<unix millis>_<9 base36 chars>`
fn mock_tx_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!(
        "irys_mock_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        suffix
    )
}
