use std::path::PathBuf;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use albaran_api::config::ApiConfig;
use albaran_api::infra::signature::FetchLimits;
use albaran_api::router::build_router;
use albaran_api::state::AppState;
use albaran_auth_types::cookie::CookieSettings;
use albaran_auth_types::identity::JwtSecret;
use albaran_core::config::Config;
use albaran_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let signature_limits = FetchLimits {
        timeout: Duration::from_secs(config.signature_timeout_secs),
        max_bytes: config.signature_max_bytes,
    };
    let http = reqwest::Client::builder()
        .connect_timeout(signature_limits.timeout)
        .build()
        .expect("failed to build http client");

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret),
        cookies: CookieSettings {
            domain: config.cookie_domain,
            secure: config.cookie_secure,
        },
        bcrypt_cost: config.bcrypt_cost,
        pdf_dir: PathBuf::from(config.pdf_dir),
        http,
        signature_limits,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("albaran api listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
