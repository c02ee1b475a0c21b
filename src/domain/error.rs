use thiserror::Error;

/// The one failure kind a fetch can end in. Unreachable host, DNS failure
/// and URLs the transport rejects all collapse into this.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("URL is invalid or cannot reach website: {url} ({detail})")]
pub struct NetworkError {
    pub url: String,
    pub detail: String,
}
