//! Client-side driver of the generation flow: post the prompt to the
//! backend, fall back to a locally rendered placeholder on any failure, and
//! record the outcome in the history. A submission always yields exactly one
//! visible entry; errors never surface to the user.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::history::HistoryStore;
use crate::models::{GenerationRequest, GenerationResult, HistoryEntry};
use crate::placeholder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateImageResponse {
    image_data_url: String,
}

pub struct GenerationController {
    http: Client,
    endpoints: Vec<String>,
    history: Arc<HistoryStore>,
}

impl GenerationController {
    /// `endpoints` are tried in order; the original front end probes the
    /// relative path first and a localhost absolute URL second.
    pub fn new(endpoints: Vec<String>, history: Arc<HistoryStore>) -> Self {
        Self {
            http: Client::new(),
            endpoints,
            history,
        }
    }

    /// Runs one submission to completion and returns the recorded entry.
    pub async fn submit(&self, request: GenerationRequest) -> HistoryEntry {
        let (image_data_url, is_fallback) = match self.try_generate(&request).await {
            Some(url) => (url, false),
            None => {
                info!("falling back to a local placeholder");
                (
                    placeholder::render(&request.prompt, request.style, request.ratio),
                    true,
                )
            }
        };

        let entry = HistoryEntry::new(GenerationResult {
            prompt: request.prompt.trim().to_string(),
            style: request.style,
            ratio: request.ratio,
            image_data_url,
            created_at: Utc::now(),
            is_fallback,
        });
        self.history.insert(entry.clone());
        entry
    }

    /// Repeats the flow with a prior entry's prompt, style and ratio.
    pub async fn regenerate(&self, entry: &HistoryEntry) -> HistoryEntry {
        self.submit(GenerationRequest {
            prompt: entry.result.prompt.clone(),
            style: entry.result.style,
            ratio: entry.result.ratio,
        })
        .await
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Option<String> {
        for endpoint in &self.endpoints {
            match self.http.post(endpoint).json(request).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<GenerateImageResponse>().await {
                        Ok(body) => return Some(body.image_data_url),
                        Err(e) => warn!(%endpoint, error = %e, "unparseable generate response"),
                    }
                }
                Ok(response) => {
                    warn!(%endpoint, status = %response.status(), "generate request rejected")
                }
                Err(e) => warn!(%endpoint, error = %e, "generate request failed"),
            }
        }
        None
    }
}
