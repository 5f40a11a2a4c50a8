// Trait seams for the two external collaborators.
//
// DeepReviewer: Film Room highlight analysis for flagged dossiers.
// SpeechSynthesizer: text-to-speech for audio scripts.
//
// Both are best-effort: callers bound them with a timeout and degrade on any
// error. Mocks live in `testing.rs`.

use anyhow::Result;
use async_trait::async_trait;

use elevenlabs_client::ElevenLabsClient;
use film_room_client::{AnalyzeRequest, FilmRoomClient};
use gridiron_common::Dossier;

#[async_trait]
pub trait DeepReviewer: Send + Sync {
    /// Request secondary analysis. `Ok(None)` means the reviewer had nothing to add.
    async fn analyze(&self, dossier: &Dossier) -> Result<Option<serde_json::Value>>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into encoded audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl DeepReviewer for FilmRoomClient {
    async fn analyze(&self, dossier: &Dossier) -> Result<Option<serde_json::Value>> {
        let request = AnalyzeRequest::highlight_reel(&dossier.dossier_id, &dossier.prospect_name);
        let body = FilmRoomClient::analyze(self, &request).await?;
        Ok(if body.is_null() { None } else { Some(body) })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Ok(self.text_to_speech(text).await?)
    }
}
