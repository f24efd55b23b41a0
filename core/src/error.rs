use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the stores and the generation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Malformed recipe response: {0}")]
    MalformedResponse(String),

    #[error("Recipe generation failed: {0}")]
    Generation(String),

    #[error("Request was abandoned before the recipe could be stored")]
    Abandoned,

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    Poisoned,
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for failures the user can fix by resubmitting the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::MalformedResponse(_))
    }
}

/// Failure of a report submission. Never affects the stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Could not reach the report service: {0}")]
    Transport(String),

    #[error("Report was not accepted: {0}")]
    Rejected(String),

    #[error("Unexpected response from the report service: {0}")]
    InvalidResponse(String),
}
