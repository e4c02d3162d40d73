//! Runtime configuration, read from the environment (and `.env` via the binary).

use crate::error::{BilregError, Result};
use crate::tools::credentials::CredentialSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://biluppgifter.se";

const DEFAULT_REFRESH_COOLDOWN_SECS: u64 = 60;
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 25;
const DEFAULT_CHALLENGE_WAIT_SECS: u64 = 15;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BUDGET: u32 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    /// Credentials used when automated refresh is unavailable or fails.
    pub fallback: CredentialSet,
    pub refresh_cooldown: Duration,
    pub refresh_timeout: Duration,
    /// How long the browser waits for an interstitial challenge to clear.
    pub challenge_wait: Duration,
    pub request_timeout: Duration,
    pub retry_budget: u32,
    pub chromium_path: Option<PathBuf>,
    pub browser_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default base url"),
            fallback: CredentialSet::new(),
            refresh_cooldown: Duration::from_secs(DEFAULT_REFRESH_COOLDOWN_SECS),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
            challenge_wait: Duration::from_secs(DEFAULT_CHALLENGE_WAIT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_budget: DEFAULT_RETRY_BUDGET,
            chromium_path: None,
            browser_enabled: true,
        }
    }
}

impl Config {
    /// Build a config from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, map, ...).
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(raw) = non_empty(get("BILUPPGIFTER_BASE_URL")) {
            cfg.base_url = Url::parse(&raw)?;
        }

        cfg.fallback = CredentialSet::from_tokens(
            &get("BILUPPGIFTER_SESSION").unwrap_or_default(),
            &get("BILUPPGIFTER_CF_CLEARANCE").unwrap_or_default(),
            &get("BILUPPGIFTER_ANTIFORGERY").unwrap_or_default(),
        );

        if let Some(secs) = parse_var::<u64>(&get, "BILREG_REFRESH_COOLDOWN_SECS")? {
            cfg.refresh_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&get, "BILREG_REFRESH_TIMEOUT_SECS")? {
            cfg.refresh_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&get, "BILREG_CHALLENGE_WAIT_SECS")? {
            cfg.challenge_wait = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&get, "BILREG_REQUEST_TIMEOUT_SECS")? {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(budget) = parse_var::<u32>(&get, "BILREG_RETRY_BUDGET")? {
            cfg.retry_budget = budget;
        }

        cfg.chromium_path = non_empty(get("BILREG_CHROMIUM_PATH")).map(PathBuf::from);

        if let Some(raw) = non_empty(get("BILREG_BROWSER")) {
            cfg.browser_enabled = parse_flag(&raw).ok_or_else(|| {
                BilregError::Config(format!("BILREG_BROWSER: expected a boolean, got {raw:?}"))
            })?;
        }

        Ok(cfg)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(get(key)) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| BilregError::Config(format!("{key}: {e} (got {raw:?})"))),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
