use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use pixel_bloom::provider::{ClipdropClient, ImageProvider};
use pixel_bloom::routes::{self, AppState};
use pixel_bloom::service::GenerationService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // The credential is read once here and injected; business logic never
    // touches the environment. Absence is a request-time 400, not a crash.
    let provider: Option<Arc<dyn ImageProvider>> = match std::env::var("CLIPDROP_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            tracing::info!(
                "Using ClipDrop API key: {}...",
                &key[..std::cmp::min(6, key.len())]
            );
            Some(Arc::new(ClipdropClient::new(key)))
        }
        _ => {
            tracing::warn!("CLIPDROP_API_KEY is not set; generation requests will be rejected");
            None
        }
    };

    let state = AppState {
        service: Arc::new(GenerationService::new(provider)),
    };
    let app = routes::app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "[Pixel Bloom] API + frontend available");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
