use std::sync::Arc;

use crate::config::{Config, UploaderMode};
use crate::irys::{BundlerFactory, CredentialSource};
use crate::paper::OpenAlexClient;
use crate::upload::uploader::MockUploaderFactory;
use crate::upload::{UploadService, UploaderFactory, UploaderSession};

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline, owning the process-wide uploader session
    pub upload: Arc<UploadService>,
    /// OpenAlex lookup client
    pub openalex: Arc<OpenAlexClient>,
    /// Largest JSON body accepted on the upload route
    pub json_body_limit_bytes: usize,
    /// Per-IP uploads per minute, 0 disables
    pub upload_rate_limit_per_minute: u32,
    /// Built frontend served for non-API paths
    pub static_dir: Option<String>,
}

impl AppState {
    /// Wire the production state from configuration.
    ///
    /// No uploader is constructed here; the wallet is read on the first upload.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let upload_config = config.upload();
        let http = reqwest::Client::builder()
            .user_agent(concat!("scai-press-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let factory: Arc<dyn UploaderFactory> = match upload_config.mode {
            UploaderMode::Irys => Arc::new(BundlerFactory::new(
                http.clone(),
                &upload_config.node_url,
                &upload_config.currency,
                CredentialSource::Env(upload_config.credential_env.clone()),
            )),
            UploaderMode::Mock => Arc::new(MockUploaderFactory),
        };

        let upload = UploadService::new(
            UploaderSession::new(factory),
            upload_config.max_size_bytes,
            &upload_config.gateway_url,
        );

        Ok(Self {
            upload: Arc::new(upload),
            openalex: Arc::new(OpenAlexClient::new(http, &config.paper())),
            json_body_limit_bytes: upload_config.json_body_limit_bytes,
            upload_rate_limit_per_minute: upload_config.rate_limit_per_minute,
            static_dir: config.static_dir.clone(),
        })
    }
}
