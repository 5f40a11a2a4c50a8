pub mod error;

pub use error::{ElevenLabsError, Result};

use std::time::Duration;

use serde::Serialize;

const BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Multilingual model used for all podcast clips.
pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
}

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: &str, voice_id: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            voice_id: voice_id.to_string(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Send requests to `base_url` instead of the public API root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Synthesize `text` to MP3 bytes.
    pub async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let body = SpeechRequest {
            text,
            model_id: DEFAULT_MODEL,
            voice_settings: VoiceSettings::default(),
        };

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ElevenLabsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let audio = resp.bytes().await?;
        if audio.is_empty() {
            return Err(ElevenLabsError::EmptyAudio);
        }

        tracing::debug!(bytes = audio.len(), voice_id = self.voice_id.as_str(), "Speech synthesized");
        Ok(audio.to_vec())
    }
}
