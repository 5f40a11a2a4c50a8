use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::WarRoomError;

const DEFAULT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";

/// Application configuration loaded from environment variables.
///
/// Nothing is required: with no collaborators configured the service still
/// grades and ranks, skips deep review, and emits text-only audio scripts.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Collaborators
    pub film_room_url: Option<String>,
    pub scout_hub_url: String,
    pub chickenhawk_core_url: String,
    pub elevenlabs_api_key: String,
    pub elevenlabs_voice_id: String,
    pub brave_api_key: String,
    pub collaborator_timeout: Duration,

    // Shared volumes
    pub debate_log_dir: PathBuf,
    pub content_dir: PathBuf,

    // Grading
    pub grading_seed: Option<u64>,
    pub concern_keywords: Vec<String>,
    pub debate_margin: f64,

    // Retention
    pub retention_limit: usize,
}

impl Config {
    /// Load configuration from environment variables, applying defaults.
    pub fn from_env() -> Result<Self, WarRoomError> {
        Ok(Self {
            web_host: env_or("WEB_HOST", "0.0.0.0"),
            web_port: parsed_env("PORT", 5003)?,
            // Unset falls back to the compose hostname; set-but-empty disables deep review.
            film_room_url: match env::var("FILM_ROOM_URL") {
                Ok(url) if url.trim().is_empty() => None,
                Ok(url) => Some(url),
                Err(_) => Some("http://film-room:5002".to_string()),
            },
            scout_hub_url: env_or("SCOUT_HUB_URL", "http://scout-hub:5001"),
            chickenhawk_core_url: env_or("CHICKENHAWK_CORE_URL", "http://chickenhawk-core:4001"),
            elevenlabs_api_key: env_or("ELEVENLABS_API_KEY", ""),
            elevenlabs_voice_id: env_or("ELEVENLABS_VOICE_ID", DEFAULT_VOICE_ID),
            brave_api_key: env_or("BRAVE_API_KEY", ""),
            collaborator_timeout: Duration::from_secs(parsed_env("COLLABORATOR_TIMEOUT_SECS", 15)?),
            debate_log_dir: PathBuf::from(env_or("DEBATE_LOG_DIR", "/data/debate-logs")),
            content_dir: PathBuf::from(env_or("CONTENT_DIR", "/data/content")),
            grading_seed: match optional_env("GRADING_SEED") {
                Some(raw) => Some(parse_value("GRADING_SEED", &raw)?),
                None => None,
            },
            concern_keywords: keyword_list(&env_or("CONCERN_KEYWORDS", "limited,insufficient")),
            debate_margin: debate_margin(parsed_env("DEBATE_MARGIN", 10.0)?)?,
            retention_limit: parsed_env("RETENTION_LIMIT", 100)?,
        })
    }

    pub fn tts_configured(&self) -> bool {
        !self.elevenlabs_api_key.is_empty()
    }

    pub fn brave_configured(&self) -> bool {
        !self.brave_api_key.is_empty()
    }

    /// Log the effective configuration without secrets.
    pub fn log_redacted(&self) {
        info!(
            host = self.web_host.as_str(),
            port = self.web_port,
            film_room = self.film_room_url.as_deref().unwrap_or("disabled"),
            scout_hub = self.scout_hub_url.as_str(),
            chickenhawk_core = self.chickenhawk_core_url.as_str(),
            elevenlabs = redact(&self.elevenlabs_api_key),
            brave = redact(&self.brave_api_key),
            timeout_secs = self.collaborator_timeout.as_secs(),
            debate_log_dir = %self.debate_log_dir.display(),
            content_dir = %self.content_dir.display(),
            seeded = self.grading_seed.is_some(),
            retention_limit = self.retention_limit,
            "War Room configuration"
        );
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "not configured"
    } else {
        "configured"
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Set and non-empty.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> Result<T, WarRoomError> {
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, WarRoomError> {
    raw.trim()
        .parse()
        .map_err(|_| WarRoomError::Config(format!("{key} has an invalid value: {raw}")))
}

/// The margin is a hysteresis band, so it must be finite and non-negative.
fn debate_margin(value: f64) -> Result<f64, WarRoomError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(WarRoomError::Config(format!(
            "DEBATE_MARGIN must be a finite, non-negative number, got {value}"
        )))
    }
}

/// Split a comma list into lowercase, non-empty keywords.
pub fn keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
