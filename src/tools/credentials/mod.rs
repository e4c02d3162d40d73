//! Credential Tools
//!
//! Session cookies needed to get past the target site's bot check: a
//! rate-limited cache plus the sources it can refresh from.

mod browser;
mod cache;
mod source;

pub mod types;

pub use browser::{find_chromium, BrowserSource};
pub use cache::CredentialCache;
pub use source::{CredentialSource, NoopSource};
pub use types::*;

use crate::config::Config;
use std::sync::Arc;

/// Build the credential cache described by `config`.
///
/// Fallback tokens from the environment also seed the cache, so a configured
/// session is used right away and the browser only runs after a rejection.
pub fn cache_from_config(config: &Config) -> CredentialCache {
    let source: Arc<dyn CredentialSource> = if config.browser_enabled {
        Arc::new(
            BrowserSource::new(config.base_url.clone())
                .with_chromium_path(config.chromium_path.clone())
                .with_challenge_wait(config.challenge_wait),
        )
    } else {
        Arc::new(NoopSource)
    };

    let cache = CredentialCache::new(source)
        .with_fallback(config.fallback.clone())
        .with_cooldown(config.refresh_cooldown)
        .with_refresh_timeout(config.refresh_timeout);

    if config.fallback.is_empty() {
        cache
    } else {
        cache.with_seed(config.fallback.clone())
    }
}
