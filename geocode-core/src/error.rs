use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong during a single geocoding lookup.
///
/// None of these are retried by the client; they are surfaced to the caller as-is.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Missing or empty credential, or an unusable configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The query text was empty or whitespace only.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Anything that failed before a complete response was received
    /// (DNS, connection, TLS, timeout, reading the body).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Geoapify request failed with status {status}: {}", truncate_body(.body))]
    Remote { status: StatusCode, body: String },

    /// The response body was not valid JSON.
    #[error("Failed to parse Geoapify response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GeocodeError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status of a `Remote` error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, GeocodeError>;

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
