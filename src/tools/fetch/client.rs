use crate::error::{BilregError, Result};
use reqwest::{redirect, Client};
use std::time::Duration;

const REDIRECT_LIMIT: usize = 10;
const POOL_IDLE_TIMEOUT_SEC: u64 = 90;
const POOL_MAX_IDLE_PER_HOST: usize = 8;

/// Build the reqwest client used for page fetches.
///
/// No cookie store: cookies come from the credential cache on every request.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SEC))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .build()
        .map_err(|e| BilregError::Other(format!("Failed to build client: {e}")))
}
