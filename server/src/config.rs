use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Command-line flags. Only flags actually passed reach the merged config,
/// so an absent flag never shadows the TOML file or `SCAI_*` variables.
#[derive(Parser, Serialize, Clone, Debug, Default)]
#[command(name = "scai-press-server", version, about = "SCAI Press upload and paper lookup server")]
pub struct Cli {
    /// Port to listen on [default: 3001]
    #[arg(long, env = "PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bind address [default: 0.0.0.0]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,

    /// Path to TOML config file
    #[arg(long, default_value = "./scai-press.toml")]
    #[serde(skip)]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub generate_config: bool,

    /// Directory holding a built frontend; non-API paths fall back to its index.html
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
}

/// Server configuration after all layers are merged.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default)]
    pub generate_config: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,

    /// Upload pipeline configuration (the [upload] section)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadConfig>,

    /// Paper lookup configuration (the [paper] section)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper: Option<PaperConfig>,
}

/// Which uploader backs `POST /api/irys/upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploaderMode {
    /// Sign data items with the configured Solana wallet and post them to the bundler node
    Irys,
    /// Return fabricated transaction ids without touching the network
    Mock,
}

/// Configuration for the upload pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted payload in bytes (default: 102400 = 100 KiB, the Irys free tier)
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,

    /// Largest accepted JSON request body in bytes (default: 10 MiB).
    /// Byte arrays cost up to four JSON characters per byte.
    #[serde(default = "default_json_body_limit")]
    pub json_body_limit_bytes: usize,

    /// Base URL that receipts are resolved against
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Bundler node accepting signed data items
    #[serde(default = "default_node_url")]
    pub node_url: String,

    /// Currency path segment on the bundler node
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Environment variable holding the wallet secret key
    #[serde(default = "default_credential_env")]
    pub credential_env: String,

    /// Uploader backend (default: irys)
    #[serde(default = "default_mode")]
    pub mode: UploaderMode,

    /// Uploads allowed per client IP per minute (0 disables the limit)
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            json_body_limit_bytes: default_json_body_limit(),
            gateway_url: default_gateway_url(),
            node_url: default_node_url(),
            currency: default_currency(),
            credential_env: default_credential_env(),
            mode: default_mode(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
        }
    }
}

fn default_max_size_bytes() -> usize {
    100 * 1024
}
fn default_json_body_limit() -> usize {
    10 * 1024 * 1024
}
fn default_gateway_url() -> String {
    "https://gateway.irys.xyz".to_string()
}
fn default_node_url() -> String {
    "https://uploader.irys.xyz".to_string()
}
fn default_currency() -> String {
    "solana".to_string()
}
fn default_credential_env() -> String {
    "PRIVATE_KEY".to_string()
}
fn default_mode() -> UploaderMode {
    UploaderMode::Irys
}
fn default_rate_limit_per_minute() -> u32 {
    30
}

/// Configuration for the OpenAlex paper lookup proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// OpenAlex API base URL
    #[serde(default = "default_openalex_url")]
    pub openalex_url: String,

    /// User-Agent sent to OpenAlex (their polite pool wants a mailto)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            openalex_url: default_openalex_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_openalex_url() -> String {
    "https://api.openalex.org".to_string()
}
fn default_user_agent() -> String {
    "SCAI-Box/1.0 (mailto:contact@scai.com)".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            bind_address: "0.0.0.0".to_string(),
            json_logs: false,
            generate_config: false,
            static_dir: None,
            upload: Some(UploadConfig::default()),
            paper: Some(PaperConfig::default()),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (SCAI_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Cli::parse();
        let config_path = cli.config.clone();

        Self::figment(cli, &config_path).extract()
    }

    /// The `[upload]` section, falling back to defaults when absent
    pub fn upload(&self) -> UploadConfig {
        self.upload.clone().unwrap_or_default()
    }

    /// The `[paper]` section, falling back to defaults when absent
    pub fn paper(&self) -> PaperConfig {
        self.paper.clone().unwrap_or_default()
    }

    pub fn figment(cli: Cli, config_path: &str) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SCAI_").split("__"))
            .merge(Serialized::defaults(cli))
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# SCAI Press Server Configuration
# Place this file at ./scai-press.toml or specify with --config <path>
# Settings can be overridden via environment variables (SCAI_BIND_ADDRESS,
# SCAI_UPLOAD__MAX_SIZE_BYTES, ...) or CLI flags (--port, ...).

# Server port (default: 3001, also read from PORT)
# port = 3001

# Bind address (default: 0.0.0.0, all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Serve a built frontend from this directory (unknown paths get index.html)
# static_dir = "./build"

# ---- Irys Uploads ----
# [upload]

# Largest accepted payload in bytes (default: 102400 = 100 KiB free tier)
# max_size_bytes = 102400

# Largest accepted JSON body in bytes (default: 10 MiB)
# json_body_limit_bytes = 10485760

# Gateway used to build receipt URLs
# gateway_url = "https://gateway.irys.xyz"

# Bundler node and currency the signed data items are posted to
# node_url = "https://uploader.irys.xyz"
# currency = "solana"

# Environment variable holding the Solana wallet secret (base58 or JSON array)
# credential_env = "PRIVATE_KEY"

# "irys" uploads for real, "mock" fabricates transaction ids for development
# mode = "irys"

# Uploads per client IP per minute (0 disables)
# rate_limit_per_minute = 30

# ---- Paper Lookup ----
# [paper]
# openalex_url = "https://api.openalex.org"
# user_agent = "SCAI-Box/1.0 (mailto:contact@scai.com)"
"#
    .to_string()
}
