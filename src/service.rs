use std::sync::Arc;

use axum::http::StatusCode;
use base64::Engine;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::GenerationRequest;
use crate::policy;
use crate::provider::{ImageProvider, ProviderOutcome, TransportKind};

/// Everything `generate` can refuse or fail with. Rejections (empty prompt,
/// missing credential, policy) happen before any provider cost; failures wrap
/// a provider or transport outcome.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Prompt is required")]
    EmptyPrompt,
    #[error("Missing CLIPDROP_API_KEY. Set it in .env")]
    MissingApiKey,
    #[error("Prompt violates content policy")]
    PolicyViolation,
    #[error("{message}")]
    Provider { status: u16, message: String },
    #[error("Image generation timed out")]
    Timeout,
    #[error("Image provider is unreachable")]
    Unreachable,
}

impl GenerateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GenerateError::EmptyPrompt | GenerateError::MissingApiKey => StatusCode::BAD_REQUEST,
            GenerateError::PolicyViolation => StatusCode::FORBIDDEN,
            // Pass the provider's own error status through; a nominally
            // successful status carrying a non-image body maps to 502.
            GenerateError::Provider { status, .. } if *status >= 400 => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            GenerateError::Provider { .. } => StatusCode::BAD_GATEWAY,
            GenerateError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GenerateError::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn is_policy(&self) -> bool {
        matches!(self, GenerateError::PolicyViolation)
    }
}

/// Orchestrates one generation request: validate, filter, call the provider,
/// normalize the outcome. The provider is injected at construction; `None`
/// means no credential was configured and every request is rejected with a
/// configuration error.
pub struct GenerationService {
    provider: Option<Arc<dyn ImageProvider>>,
}

impl GenerationService {
    pub fn new(provider: Option<Arc<dyn ImageProvider>>) -> Self {
        Self { provider }
    }

    /// Runs the pipeline and returns a self-contained image data URL. Exactly
    /// one provider call per invocation, no retries; fallback lives in the
    /// caller.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        let provider = self.provider.as_ref().ok_or(GenerateError::MissingApiKey)?;

        let verdict = policy::evaluate(prompt);
        if let Some(term) = verdict.violated_term {
            // Audit trail stays server-side; the response carries only the
            // generic policy message.
            warn!(%term, "prompt rejected by content policy");
            return Err(GenerateError::PolicyViolation);
        }

        match provider.request_image(prompt).await {
            ProviderOutcome::Success { bytes, mime_type } => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
                info!(%mime_type, size = bytes.len(), "✅ image generated");
                Ok(format!("data:{mime_type};base64,{encoded}"))
            }
            ProviderOutcome::ProviderError { status, message } => {
                Err(GenerateError::Provider { status, message })
            }
            ProviderOutcome::TransportError { kind } => Err(match kind {
                TransportKind::Timeout => GenerateError::Timeout,
                TransportKind::Unreachable => GenerateError::Unreachable,
            }),
        }
    }
}
