use thiserror::Error;

pub type Result<T, E = ReaderError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// The summary request failed; the only failure that reaches the page.
    #[error("article {topic:?} not found: {reason}")]
    NotFound { topic: String, reason: String },
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid theme {0:?}, expected `light` or `dark`")]
    InvalidTheme(String),
}

impl ReaderError {
    pub fn not_found(topic: impl Into<String>, reason: impl ToString) -> Self {
        ReaderError::NotFound {
            topic: topic.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReaderError::NotFound { .. })
    }
}
