use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrollError {
    /// Non-success HTTP status, rendered as `404 - Not Found`.
    #[error("{status} - {reason}")]
    Http { status: u16, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrollError>;
