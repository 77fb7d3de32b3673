use serde::Deserialize;

use albaran_core::config::Config;

/// API service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC key for session tokens.
    pub jwt_secret: String,
    /// TCP port for the HTTP server. Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Directory for cached PDF renders. Env var: `PDF_DIR`.
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: String,
    /// `Domain` attribute of the session cookie.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Deadline for fetching a signature image by URL.
    #[serde(default = "default_signature_timeout_secs")]
    pub signature_timeout_secs: u64,
    #[serde(default = "default_signature_max_bytes")]
    pub signature_max_bytes: usize,
}

fn default_api_port() -> u16 {
    3000
}

fn default_pdf_dir() -> String {
    "storage/pdfs".to_owned()
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_signature_timeout_secs() -> u64 {
    10
}

fn default_signature_max_bytes() -> usize {
    5 * 1024 * 1024
}

impl Config for ApiConfig {}
