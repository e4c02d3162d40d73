//! Chromium-backed credential harvesting using chromiumoxide.

use super::source::CredentialSource;
use super::types::CredentialSet;
use crate::error::{BilregError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

const CHALLENGE_POLL: Duration = Duration::from_millis(500);

/// Page titles shown while an interstitial challenge is running.
const CHALLENGE_TITLES: [&str; 4] = [
    "just a moment",
    "checking your browser",
    "attention required",
    "please wait",
];

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
    }

    if let Some(dirs) = directories::UserDirs::new() {
        let home = dirs.home_dir();
        let candidates = [
            home.join(".bilreg/chromium/chrome-linux64/chrome"),
            home.join(".bilreg/chromium/chrome"),
        ];
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// True when the page title looks like a challenge interstitial.
pub(crate) fn is_challenge_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    CHALLENGE_TITLES.iter().any(|t| lower.contains(t))
}

/// Visits the target site in headless Chromium and keeps the tracked cookies.
pub struct BrowserSource {
    base_url: Url,
    chromium_path: Option<PathBuf>,
    challenge_wait: Duration,
}

impl BrowserSource {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            chromium_path: None,
            challenge_wait: Duration::from_secs(15),
        }
    }

    pub fn with_chromium_path(mut self, path: Option<PathBuf>) -> Self {
        self.chromium_path = path;
        self
    }

    pub fn with_challenge_wait(mut self, wait: Duration) -> Self {
        self.challenge_wait = wait;
        self
    }

    async fn visit(&self, browser: &Browser) -> Result<CredentialSet> {
        let page = browser
            .new_page(self.base_url.as_str())
            .await
            .map_err(|e| BilregError::refresh("failed to open page", e))?;

        self.wait_for_challenge(&page).await;

        let cookies = page
            .get_cookies()
            .await
            .map_err(|e| BilregError::refresh("failed to read cookies", e))?;
        tracing::debug!(total = cookies.len(), "browser session cookies read");

        Ok(CredentialSet::from_cookies(
            cookies.into_iter().map(|c| (c.name, c.value)),
        ))
    }

    /// Poll the title until the challenge clears or the wait runs out.
    /// Either way the caller proceeds to read cookies.
    async fn wait_for_challenge(&self, page: &Page) {
        let deadline = Instant::now() + self.challenge_wait;
        loop {
            let title = page.get_title().await.ok().flatten().unwrap_or_default();
            if !is_challenge_title(&title) {
                return;
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    wait_secs = self.challenge_wait.as_secs(),
                    "challenge still showing, reading cookies anyway"
                );
                return;
            }
            tokio::time::sleep(CHALLENGE_POLL).await;
        }
    }
}

#[async_trait]
impl CredentialSource for BrowserSource {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn harvest(&self) -> Result<CredentialSet> {
        let chrome_path = find_chromium(self.chromium_path.as_ref()).ok_or_else(|| {
            BilregError::Refresh("Chromium not found; set BILREG_CHROMIUM_PATH".into())
        })?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|e| BilregError::refresh("failed to build browser config", e))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BilregError::refresh("failed to launch Chromium", e))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let result = self.visit(&browser).await;

        if let Err(e) = browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
        let _ = browser.wait().await;
        events.abort();

        result
    }
}
