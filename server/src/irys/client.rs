use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::UploadError;
use crate::irys::data_item::DataItem;
use crate::irys::wallet::SolanaWallet;
use crate::upload::{Tag, UploadReceipt, Uploader, UploaderFactory};

/// Where the wallet secret comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read the named environment variable every time construction is attempted
    Env(String),
    /// A secret supplied directly (tests, embedding)
    Inline(String),
}

impl CredentialSource {
    fn read(&self) -> Result<String, UploadError> {
        match self {
            CredentialSource::Env(name) => std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| UploadError::MissingCredential(name.clone())),
            CredentialSource::Inline(secret) => Ok(secret.clone()),
        }
    }
}

/// Bundler node reply to a data item post. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct NodeReceipt {
    id: String,
}

/// Signs uploads with one wallet and posts them to a bundler node.
#[derive(Debug)]
pub struct BundlerClient {
    http: reqwest::Client,
    endpoint: String,
    wallet: SolanaWallet,
}

impl BundlerClient {
    pub fn new(http: reqwest::Client, node_url: &str, currency: &str, wallet: SolanaWallet) -> Self {
        Self {
            http,
            endpoint: format!("{}/tx/{}", node_url.trim_end_matches('/'), currency),
            wallet,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn address(&self) -> String {
        self.wallet.address()
    }
}

#[async_trait]
impl Uploader for BundlerClient {
    async fn upload(&self, data: &[u8], tags: &[Tag]) -> Result<UploadReceipt, UploadError> {
        let item = DataItem::sign(&self.wallet, data, tags)?;
        let local_id = item.id().to_string();
        tracing::debug!(
            "Posting data item {} ({} bytes) to {}",
            local_id,
            item.as_bytes().len(),
            self.endpoint
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(item.into_bytes())
            .send()
            .await
            .map_err(|e| UploadError::Dispatch(format!("bundler node unreachable: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Dispatch(format!(
                "bundler node returned {}: {}",
                status,
                body.trim()
            )));
        }

        let receipt: NodeReceipt = resp
            .json()
            .await
            .map_err(|e| UploadError::Dispatch(format!("unreadable bundler receipt: {}", e)))?;

        if receipt.id != local_id {
            tracing::warn!(
                "Bundler id {} differs from locally computed id {}",
                receipt.id,
                local_id
            );
        }

        Ok(UploadReceipt { id: receipt.id })
    }
}

/// Builds a [`BundlerClient`] from the wallet credential.
pub struct BundlerFactory {
    http: reqwest::Client,
    node_url: String,
    currency: String,
    credential: CredentialSource,
}

impl BundlerFactory {
    pub fn new(
        http: reqwest::Client,
        node_url: &str,
        currency: &str,
        credential: CredentialSource,
    ) -> Self {
        Self {
            http,
            node_url: node_url.to_string(),
            currency: currency.to_string(),
            credential,
        }
    }
}

#[async_trait]
impl UploaderFactory for BundlerFactory {
    async fn connect(&self) -> Result<Arc<dyn Uploader>, UploadError> {
        let secret = self.credential.read()?;
        let wallet = SolanaWallet::from_secret(&secret)?;
        let client = BundlerClient::new(self.http.clone(), &self.node_url, &self.currency, wallet);
        tracing::info!(
            "Irys uploader ready for wallet {} via {}",
            client.address(),
            client.endpoint()
        );
        Ok(Arc::new(client))
    }
}
