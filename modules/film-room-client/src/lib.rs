pub mod error;

pub use error::{FilmRoomError, Result};

use std::time::Duration;

use serde::Serialize;

/// Analysis mode requested for flagged prospects.
pub const HIGHLIGHT_REEL: &str = "HIGHLIGHT_REEL";

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub request_id: String,
    pub prospect_name: String,
    pub video_url: String,
    pub click_coords: Vec<[u32; 2]>,
    pub analysis_type: String,
}

impl AnalyzeRequest {
    /// Highlight-reel request centred on the default click point.
    /// The video URL stays empty until prospects carry film links.
    pub fn highlight_reel(request_id: &str, prospect_name: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            prospect_name: prospect_name.to_string(),
            video_url: String::new(),
            click_coords: vec![[500, 300]],
            analysis_type: HIGHLIGHT_REEL.to_string(),
        }
    }
}

pub struct FilmRoomClient {
    client: reqwest::Client,
    base_url: String,
}

impl FilmRoomClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request a film analysis. The result blob is opaque to callers.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<serde_json::Value> {
        let endpoint = format!("{}/api/analyze", self.base_url);

        let resp = self.client.post(&endpoint).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FilmRoomError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = resp.json().await?;
        tracing::debug!(request_id = request.request_id.as_str(), "Film Room analysis received");
        Ok(body)
    }
}
