use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP protocol error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse or serialize JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Header error: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Agent backend rejected the request: {0}")]
    Backend(String),

    #[error("Invalid agent configuration: {0}")]
    InvalidConfig(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("The session was closed unexpectedly")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
