use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Classified page fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FetchError {
    /// The site kept rejecting us after the retry budget was spent.
    #[error("request blocked by the site's bot check (HTTP 403); refresh the cf_clearance cookie")]
    Forbidden,
    /// Any status other than 200 or 403.
    #[error("HTTP {0} from upstream")]
    UpstreamError(u16),
    #[error("request timed out")]
    Timeout,
    /// Network failure that is not a timeout (DNS, refused connection, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Page body or a classified failure.
pub type FetchResult = std::result::Result<String, FetchError>;

/// Knobs for [`super::PageFetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// How many times a 403 may trigger refresh-and-retry.
    pub retry_budget: u32,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retry_budget: 1,
            timeout: Duration::from_secs(30),
        }
    }
}
