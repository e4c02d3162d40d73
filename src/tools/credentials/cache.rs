use super::source::CredentialSource;
use super::types::{CredentialSet, RefreshOutcome};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};

const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);
const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(25);

type Slot = Arc<RwLock<Option<Arc<CredentialSet>>>>;

/// Shared, refreshable credential store.
///
/// Readers get an `Arc` snapshot and never wait on an in-flight refresh once a
/// value exists. Refreshes are serialized by `refresh_gate`, which also holds
/// the completion time of the last refresh for the cooldown check. A refresh
/// runs in its own task that owns the gate until the new set is installed, so
/// dropping a waiting caller never ends or duplicates it.
pub struct CredentialCache {
    source: Arc<dyn CredentialSource>,
    fallback: CredentialSet,
    cooldown: Duration,
    refresh_timeout: Duration,
    current: Slot,
    refresh_gate: Arc<Mutex<Option<Instant>>>,
}

impl CredentialCache {
    pub fn new(source: Arc<dyn CredentialSource>) -> Self {
        Self {
            source,
            fallback: CredentialSet::new(),
            cooldown: DEFAULT_COOLDOWN,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            current: Arc::new(RwLock::new(None)),
            refresh_gate: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_fallback(mut self, fallback: CredentialSet) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Start with externally supplied credentials instead of an empty cache.
    /// Seeding does not count as a refresh, so no cooldown is started.
    pub fn with_seed(self, seed: CredentialSet) -> Self {
        *self.current.write() = Some(Arc::new(seed));
        self
    }

    /// Current credentials without triggering a refresh.
    pub fn snapshot(&self) -> Option<Arc<CredentialSet>> {
        self.current.read().clone()
    }

    /// Current credentials, refreshing first if the cache is empty.
    pub async fn get(&self) -> Arc<CredentialSet> {
        if let Some(creds) = self.snapshot() {
            return creds;
        }

        let gate = Arc::clone(&self.refresh_gate).lock_owned().await;
        // Another caller may have filled the cache while we waited.
        if let Some(creds) = self.snapshot() {
            return creds;
        }
        self.refresh(gate).await.1
    }

    /// Refresh now unless the previous refresh completed within the cooldown.
    pub async fn force_refresh(&self) -> RefreshOutcome {
        let gate = Arc::clone(&self.refresh_gate).lock_owned().await;
        if let Some(done) = *gate {
            let elapsed = done.elapsed();
            if elapsed < self.cooldown {
                let retry_in = self.cooldown - elapsed;
                tracing::debug!(
                    retry_in_ms = retry_in.as_millis() as u64,
                    "refresh skipped, cooldown active"
                );
                return RefreshOutcome::skipped(retry_in);
            }
        }
        self.refresh(gate).await.0
    }

    /// Hand the held gate to a refresh task and wait for its result.
    async fn refresh(
        &self,
        gate: OwnedMutexGuard<Option<Instant>>,
    ) -> (RefreshOutcome, Arc<CredentialSet>) {
        let job = RefreshJob {
            source: Arc::clone(&self.source),
            fallback: self.fallback.clone(),
            timeout: self.refresh_timeout,
            current: Arc::clone(&self.current),
        };

        match tokio::spawn(job.run(gate)).await {
            Ok(done) => done,
            Err(join) => {
                tracing::error!(error = %join, "credential refresh task failed");
                let creds = self
                    .snapshot()
                    .unwrap_or_else(|| Arc::new(self.fallback.clone()));
                let reason = format!("refresh task failed: {join}");
                (RefreshOutcome::Fallback { reason }, creds)
            }
        }
    }
}

/// Everything a detached refresh needs, owned.
struct RefreshJob {
    source: Arc<dyn CredentialSource>,
    fallback: CredentialSet,
    timeout: Duration,
    current: Slot,
}

impl RefreshJob {
    async fn run(
        self,
        mut gate: OwnedMutexGuard<Option<Instant>>,
    ) -> (RefreshOutcome, Arc<CredentialSet>) {
        let started = Instant::now();
        let source = Arc::clone(&self.source);
        let mut task = tokio::spawn(async move { source.harvest().await });

        let harvested = match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(Ok(set))) if !set.is_empty() => Ok(set),
            Ok(Ok(Ok(_))) => Err("no tracked cookies in browser session".to_string()),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(join)) => Err(format!("harvest task failed: {join}")),
            Err(_) => {
                task.abort();
                Err(format!(
                    "refresh timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            }
        };

        let (outcome, creds) = match harvested {
            Ok(set) => {
                tracing::info!(
                    source = self.source.name(),
                    cookies = set.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "credentials refreshed"
                );
                let outcome = RefreshOutcome::Refreshed { cookies: set.len() };
                (outcome, set)
            }
            Err(reason) => {
                tracing::warn!(
                    source = self.source.name(),
                    %reason,
                    fallback_empty = self.fallback.is_empty(),
                    "credential refresh failed, using fallback credentials"
                );
                (RefreshOutcome::Fallback { reason }, self.fallback)
            }
        };

        let creds = Arc::new(creds);
        *self.current.write() = Some(Arc::clone(&creds));
        *gate = Some(Instant::now());
        (outcome, creds)
    }
}
