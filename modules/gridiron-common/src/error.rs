use thiserror::Error;

use crate::types::Pool;

#[derive(Error, Debug)]
pub enum WarRoomError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Prospect not found: {name} ({pool})")]
    NotFound { pool: String, name: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl WarRoomError {
    pub fn not_found(pool: Option<Pool>, name: &str) -> Self {
        WarRoomError::NotFound {
            pool: pool.map(|p| p.to_string()).unwrap_or_else(|| "any".to_string()),
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WarRoomError::NotFound { .. })
    }
}

impl From<std::io::Error> for WarRoomError {
    fn from(err: std::io::Error) -> Self {
        WarRoomError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WarRoomError {
    fn from(err: serde_json::Error) -> Self {
        WarRoomError::Parse(err.to_string())
    }
}
