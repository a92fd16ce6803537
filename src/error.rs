use thiserror::Error;

#[derive(Error, Debug)]
pub enum PitchWatchError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Weather data unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stale write rejected: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, PitchWatchError>;
