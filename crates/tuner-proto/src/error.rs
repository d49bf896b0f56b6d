use thiserror::Error;

#[derive(Debug, Error)]
pub enum TunerError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid url {0}")]
    Url(String),
}

pub type Result<T> = std::result::Result<T, TunerError>;
