use thiserror::Error;

pub type Result<T> = std::result::Result<T, CountError>;

#[derive(Error, Debug)]
pub enum CountError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response parse error: {0}")]
    ResponseParse(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CountError {
    fn from(err: reqwest::Error) -> Self {
        CountError::Network(err.to_string())
    }
}
