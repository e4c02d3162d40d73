use crate::tools::fetch::FetchError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BilregError>;

#[derive(Debug, Error)]
pub enum BilregError {
    /// Classified page fetch failure (forbidden, upstream status, timeout).
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("credential refresh failed: {0}")]
    Refresh(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

impl BilregError {
    pub fn refresh(context: &str, err: impl std::fmt::Display) -> Self {
        BilregError::Refresh(format!("{context}: {err}"))
    }
}

/* Conversions so `?` works smoothly */
impl From<std::io::Error> for BilregError {
    fn from(e: std::io::Error) -> Self {
        BilregError::Other(e.to_string())
    }
}
impl From<serde_json::Error> for BilregError {
    fn from(e: serde_json::Error) -> Self {
        BilregError::Other(e.to_string())
    }
}
impl From<url::ParseError> for BilregError {
    fn from(e: url::ParseError) -> Self {
        BilregError::Config(format!("invalid url: {e}"))
    }
}
