use super::types::CredentialSet;
use crate::error::{BilregError, Result};
use async_trait::async_trait;

/// Somewhere fresh credentials can be harvested from.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn harvest(&self) -> Result<CredentialSet>;
}

/// A source used when browser automation is disabled.
///
/// Every harvest fails, so the cache always degrades to its fallback values.
pub struct NoopSource;

#[async_trait]
impl CredentialSource for NoopSource {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn harvest(&self) -> Result<CredentialSet> {
        Err(BilregError::Refresh(
            "automated refresh disabled (BILREG_BROWSER=0)".into(),
        ))
    }
}
