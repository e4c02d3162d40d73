use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Session id cookie.
pub const SESSION_COOKIE: &str = "session";
/// Challenge-clearance cookie.
pub const CLEARANCE_COOKIE: &str = "cf_clearance";
/// Anti-forgery cookie.
pub const ANTIFORGERY_COOKIE: &str = ".AspNetCore.Antiforgery.KXUQR4SkAeM";

/// Cookie names kept from a browser session; everything else is dropped.
pub const TRACKED_COOKIES: [&str; 3] = [SESSION_COOKIE, CLEARANCE_COOKIE, ANTIFORGERY_COOKIE];

pub const THEME_COOKIE: &str = "theme";
pub const THEME_VALUE: &str = "dark";

/// The bundle of session/challenge tokens sent with every page request.
///
/// Only names in [`TRACKED_COOKIES`] are stored. The theme preference is not
/// stored; it is fixed and always emitted first by [`CredentialSet::cookie_header`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    tokens: BTreeMap<String, String>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from the three known token values (empty strings allowed).
    pub fn from_tokens(session: &str, clearance: &str, antiforgery: &str) -> Self {
        Self::new()
            .with(SESSION_COOKIE, session)
            .with(CLEARANCE_COOKIE, clearance)
            .with(ANTIFORGERY_COOKIE, antiforgery)
    }

    /// Build a set from arbitrary `(name, value)` cookies, keeping tracked names only.
    pub fn from_cookies<I>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        cookies
            .into_iter()
            .fold(Self::new(), |set, (name, value)| set.with(&name, &value))
    }

    /// Insert a token. Untracked names are ignored.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        if TRACKED_COOKIES.contains(&name) {
            self.tokens.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }

    /// True when no token carries a value.
    pub fn is_empty(&self) -> bool {
        self.tokens.values().all(|v| v.is_empty())
    }

    /// Number of tokens with a non-empty value.
    pub fn len(&self) -> usize {
        self.tokens.values().filter(|v| !v.is_empty()).count()
    }

    /// `Cookie` header value: theme first, then every non-empty token.
    pub fn cookie_header(&self) -> String {
        let mut parts = vec![format!("{THEME_COOKIE}={THEME_VALUE}")];
        parts.extend(
            self.tokens
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{k}={v}")),
        );
        parts.join("; ")
    }
}

/// What a refresh request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Fresh cookies were harvested and installed.
    Refreshed { cookies: usize },
    /// Harvest failed; the configured fallback credentials were installed.
    Fallback { reason: String },
    /// Inside the cooldown window; existing credentials kept.
    Skipped { retry_in_ms: u64 },
}

impl RefreshOutcome {
    pub(super) fn skipped(retry_in: Duration) -> Self {
        Self::Skipped {
            retry_in_ms: retry_in.as_millis() as u64,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}
