use thiserror::Error;

/// Failure of the end-to-end generation pipeline (prompt -> provider -> normalizer).
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("completion provider error: {0}")]
    Completion(#[from] CompletionError),
    #[error("normalization error: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Errors from the completion provider call. All variants are terminal for the
/// request; 401/403/429 are distinguished for operator messaging only.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("missing API key: set {0}")]
    MissingKey(&'static str),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("rate limit exceeded")]
    RateLimit,
    #[error("authentication failed")]
    Authentication,
    #[error("forbidden: the key may be invalid, expired, or blocked from this IP")]
    Forbidden,
    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("no choices in provider response")]
    EmptyResponse,
}

impl CompletionError {
    /// Upstream HTTP status to pass through to API callers, when one exists.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            CompletionError::RateLimit => Some(429),
            CompletionError::Authentication => Some(401),
            CompletionError::Forbidden => Some(403),
            CompletionError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors turning raw provider text into a canonical `Quiz`.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("provider returned invalid JSON: {0}. Raw response: {1}")]
    Malformed(#[source] serde_json::Error, String),
    #[error("quiz schema violation: {0}")]
    Schema(String),
}

/// Errors from the persistence backends. Never fatal to an already-generated quiz.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("persistence not configured")]
    NotConfigured,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("authentication failed")]
    Auth,
    #[error("target not found")]
    NotFound,
    #[error("backend rejected write ({status}): {body}")]
    Backend { status: u16, body: String },
    #[error("record {0} not found")]
    MissingRecord(String),
}
