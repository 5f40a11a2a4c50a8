use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilmRoomError>;

#[derive(Debug, Error)]
pub enum FilmRoomError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FilmRoomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FilmRoomError::Parse(err.to_string())
        } else {
            FilmRoomError::Network(err.to_string())
        }
    }
}
