//! Error types for content fetching and diagram compilation.
//!
//! None of these are fatal to a page: clients collapse [`FetchError`] into
//! empty results and the diagram renderer turns [`DiagramError`] into an
//! inline notice.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                body: value.to_string(),
            },
            None => Self::Network(value.to_string()),
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("diagram source is empty")]
    Empty,
    #[error("unsupported diagram type: {0}")]
    UnsupportedKind(String),
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("diagram has no nodes")]
    NoNodes,
}
