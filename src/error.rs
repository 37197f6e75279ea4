use thiserror::Error;

/// Failure classes for a fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Caller passed a relative URL or a disallowed scheme; never retried
    InvalidUrl,
    /// Navigation did not finish within the deadline
    Timeout,
    /// Connection-level failure (reset, DNS, renderer died)
    Network,
}

impl FetchKind {
    pub fn is_transient(self) -> bool {
        matches!(self, FetchKind::Timeout | FetchKind::Network)
    }
}

/// Library error taxonomy. Every variant carries a stable `kind()` tag so the
/// transport layer can route on it without parsing messages.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Bad caller input; surfaced immediately, never retried
    #[error("invalid input: {0}")]
    Validation(String),

    /// Fetch failure after retries were exhausted
    #[error("fetch failed: {message}")]
    Fetch { kind: FetchKind, message: String },

    /// A mandatory field could not be located on the page. Not retried: a
    /// malformed page will not change on refetch.
    #[error("could not extract required field `{field}`")]
    MissingField { field: &'static str },
}

impl ScoutError {
    pub fn invalid_url(message: impl Into<String>) -> Self {
        ScoutError::Fetch {
            kind: FetchKind::InvalidUrl,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScoutError::Validation(_) => "validation",
            ScoutError::Fetch {
                kind: FetchKind::InvalidUrl,
                ..
            } => "invalid_url",
            ScoutError::Fetch {
                kind: FetchKind::Timeout,
                ..
            } => "timeout",
            ScoutError::Fetch {
                kind: FetchKind::Network,
                ..
            } => "network",
            ScoutError::MissingField { .. } => "missing_field",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
