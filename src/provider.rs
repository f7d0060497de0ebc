use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

/// Fixed bound on the outbound provider call. No retries happen at this
/// layer; the caller owns fallback behavior.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_API_BASE: &str = "https://clipdrop-api.co";
const GENERIC_ERROR: &str = "Unexpected API response from ClipDrop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Unreachable,
}

/// Normalized result of exactly one provider call.
#[derive(Debug)]
pub enum ProviderOutcome {
    Success { bytes: Bytes, mime_type: String },
    ProviderError { status: u16, message: String },
    TransportError { kind: TransportKind },
}

/// Outbound text-to-image call, behind a trait so tests can substitute a
/// counting double.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn request_image(&self, prompt: &str) -> ProviderOutcome;
}

/// Client for the ClipDrop text-to-image endpoint. The endpoint accepts only
/// a `prompt` form field; style and aspect ratio are part of our own contract
/// but are not forwarded.
pub struct ClipdropClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ClipdropClient {
    pub fn new(api_key: String) -> Self {
        let base_url =
            std::env::var("CLIPDROP_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::with_base_url(api_key, base_url)
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: String,
}

#[async_trait]
impl ImageProvider for ClipdropClient {
    async fn request_image(&self, prompt: &str) -> ProviderOutcome {
        let url = format!("{}/text-to-image/v1", self.base_url);
        let form = reqwest::multipart::Form::new().text("prompt", prompt.to_string());

        let response = match self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let kind = if e.is_timeout() {
                    TransportKind::Timeout
                } else {
                    TransportKind::Unreachable
                };
                error!(error = %e, ?kind, "provider transport failure");
                return ProviderOutcome::TransportError { kind };
            }
        };

        let status = response.status();
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap_or("")
            .trim()
            .to_string();

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let kind = if e.is_timeout() {
                    TransportKind::Timeout
                } else {
                    TransportKind::Unreachable
                };
                error!(error = %e, ?kind, "provider body read failure");
                return ProviderOutcome::TransportError { kind };
            }
        };

        if status.is_success() && mime_type.starts_with("image/") {
            info!(%mime_type, size = bytes.len(), "provider returned an image");
            return ProviderOutcome::Success { bytes, mime_type };
        }

        // Failures come back as JSON with an `error` field; anything else
        // gets the generic message.
        let message = serde_json::from_slice::<ProviderErrorBody>(&bytes)
            .map(|body| body.error)
            .unwrap_or_else(|_| GENERIC_ERROR.to_string());
        error!(status = status.as_u16(), %message, "provider returned an error");
        ProviderOutcome::ProviderError {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    // 1x1 transparent PNG
    fn tiny_png() -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        let img = image::RgbaImage::new(1, 1);
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn png_response_becomes_success() {
        let png = tiny_png();
        let router = Router::new().route(
            "/text-to-image/v1",
            post(move || {
                let png = png.clone();
                async move { ([(axum::http::header::CONTENT_TYPE, "image/png")], png) }
            }),
        );
        let base = serve(router).await;

        let client = ClipdropClient::with_base_url("test-key".into(), base);
        match client.request_image("a red bicycle").await {
            ProviderOutcome::Success { bytes, mime_type } => {
                assert_eq!(mime_type, "image/png");
                assert!(!bytes.is_empty());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn json_error_body_is_surfaced() {
        let router = Router::new().route(
            "/text-to-image/v1",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "prompt too long" })),
                )
            }),
        );
        let base = serve(router).await;

        let client = ClipdropClient::with_base_url("test-key".into(), base);
        match client.request_image("x".repeat(4096).as_str()).await {
            ProviderOutcome::ProviderError { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "prompt too long");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_error_body_gets_generic_message() {
        let router = Router::new().route(
            "/text-to-image/v1",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;

        let client = ClipdropClient::with_base_url("test-key".into(), base);
        match client.request_image("a red bicycle").await {
            ProviderOutcome::ProviderError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, GENERIC_ERROR);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn two_hundred_with_non_image_body_is_a_provider_error() {
        let router = Router::new().route(
            "/text-to-image/v1",
            post(|| async { Json(json!({ "error": "quota exceeded" })) }),
        );
        let base = serve(router).await;

        let client = ClipdropClient::with_base_url("test-key".into(), base);
        match client.request_image("a red bicycle").await {
            ProviderOutcome::ProviderError { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ClipdropClient::with_base_url("test-key".into(), format!("http://{addr}"));
        match client.request_image("a red bicycle").await {
            ProviderOutcome::TransportError { kind } => {
                assert_eq!(kind, TransportKind::Unreachable);
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
