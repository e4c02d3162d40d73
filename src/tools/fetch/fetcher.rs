use super::client::build_client;
use super::headers::page_headers;
use super::types::*;
use crate::error::Result;
use crate::tools::credentials::{CredentialCache, CredentialSet};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use url::Url;

/// GETs pages from the target site with cached credentials.
///
/// A 403 spends one unit of the retry budget on a forced credential refresh
/// followed by the same request again; everything else is terminal.
pub struct PageFetcher {
    client: Client,
    base_url: Url,
    credentials: Arc<CredentialCache>,
    retry_budget: u32,
}

impl PageFetcher {
    pub fn new(base_url: Url, credentials: Arc<CredentialCache>) -> Result<Self> {
        Self::with_options(base_url, credentials, FetchOptions::default())
    }

    pub fn with_options(
        base_url: Url,
        credentials: Arc<CredentialCache>,
        options: FetchOptions,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(options.timeout)?,
            base_url,
            credentials,
            retry_budget: options.retry_budget,
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    /// Fetch `path` (relative to the base URL) and return the body of a 200.
    pub async fn fetch(&self, path: &str) -> FetchResult {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Transport(format!("invalid path {path:?}: {e}")))?;

        let mut retries = 0;
        loop {
            let creds = self.credentials.get().await;
            let (status, body) = self.request(&url, &creds).await?;

            match status {
                StatusCode::OK => {
                    tracing::debug!(%url, bytes = body.len(), retries, "page fetched");
                    return Ok(body);
                }
                StatusCode::FORBIDDEN if retries < self.retry_budget => {
                    retries += 1;
                    tracing::warn!(%url, retries, "403 from upstream, refreshing credentials");
                    let outcome = self.credentials.force_refresh().await;
                    tracing::debug!(?outcome, "refresh before retry");
                }
                StatusCode::FORBIDDEN => {
                    tracing::warn!(%url, retries, "403 from upstream, retry budget spent");
                    return Err(FetchError::Forbidden);
                }
                other => {
                    tracing::warn!(%url, status = other.as_u16(), "unexpected upstream status");
                    return Err(FetchError::UpstreamError(other.as_u16()));
                }
            }
        }
    }

    async fn request(
        &self,
        url: &Url,
        creds: &CredentialSet,
    ) -> std::result::Result<(StatusCode, String), FetchError> {
        let response = self
            .client
            .get(url.clone())
            .headers(page_headers(&self.base_url, creds))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;
        Ok((status, body))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}
