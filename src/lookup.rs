//! Lookup Facade
//!
//! The operations exposed by the CLI and the JSON API. Each one fetches the
//! pages it needs through [`PageFetcher`] and returns an owned report.

use crate::config::Config;
use crate::error::{BilregError, Result};
use crate::log::ActivityLogger;
use crate::tools::credentials::{cache_from_config, RefreshOutcome};
use crate::tools::fetch::{FetchOptions, PageFetcher};
use crate::tools::scrape::{self, *};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

const MAX_REGNR_LEN: usize = 10;

/// Reported in place of an owner when the vehicle page has no profile link.
pub const MISSING_OWNER_MESSAGE: &str = "Kunde inte hitta ägarlänk för detta fordon.";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct VehicleReport {
    pub regnr: String,
    pub page_title: String,
    pub data: Sections,
    pub owner: VehicleOwner,
    pub mileage_history: Vec<MileageReading>,
}

/// Owner of a vehicle. Without an owner link only `regnr` and `error` are set.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OwnerReport {
    pub regnr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_profile: Option<OwnerProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_history: Option<Vec<OwnerHistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OwnerReport {
    fn missing_owner(regnr: &str) -> Self {
        Self {
            regnr: regnr.to_string(),
            vehicle_title: None,
            owner_profile: None,
            owner_history: None,
            error: Some(MISSING_OWNER_MESSAGE.to_string()),
        }
    }
}

/// Vehicles registered at the address of a vehicle's current owner.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AddressReport {
    pub regnr: String,
    pub owner: String,
    pub address: String,
    pub postal_code: String,
    pub postal_city: String,
    pub owner_vehicles: OwnedVehicles,
    pub address_vehicles: Vec<VehicleLink>,
}

pub struct Lookup {
    fetcher: PageFetcher,
    activity: Option<ActivityLogger>,
}

impl Lookup {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            activity: None,
        }
    }

    /// Wire up the credential cache and fetcher described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Arc::new(cache_from_config(config));
        let options = FetchOptions {
            retry_budget: config.retry_budget,
            timeout: config.request_timeout,
        };
        let fetcher = PageFetcher::with_options(config.base_url.clone(), credentials, options)?;
        Ok(Self::new(fetcher))
    }

    pub fn with_activity_log(mut self, logger: ActivityLogger) -> Self {
        self.activity = Some(logger);
        self
    }

    pub async fn vehicle(&self, regnr: &str) -> Result<VehicleReport> {
        let regnr = normalize_regnr(regnr)?;
        self.timed("vehicle", &regnr, self.fetch_vehicle(&regnr))
            .await
    }

    pub async fn owner_profile(&self, profile_id: &str) -> Result<OwnerProfile> {
        let profile_id = validate_profile_id(profile_id)?;
        self.timed("profile", profile_id, self.fetch_profile(profile_id))
            .await
    }

    pub async fn owner_by_regnr(&self, regnr: &str) -> Result<OwnerReport> {
        let regnr = normalize_regnr(regnr)?;
        self.timed("owner", &regnr, self.fetch_owner(&regnr)).await
    }

    pub async fn address_vehicles(&self, regnr: &str) -> Result<AddressReport> {
        let regnr = normalize_regnr(regnr)?;
        self.timed("address", &regnr, async {
            let report = self.fetch_owner(&regnr).await?;
            let profile = report.owner_profile.unwrap_or_default();
            Ok(AddressReport {
                regnr: report.regnr,
                owner: profile.name.unwrap_or_default(),
                address: profile.address.unwrap_or_default(),
                postal_code: profile.postal_code.unwrap_or_default(),
                postal_city: profile.postal_city.unwrap_or_default(),
                owner_vehicles: profile.vehicles,
                address_vehicles: profile.address_vehicles.unwrap_or_default(),
            })
        })
        .await
    }

    /// Manually force a credential refresh (still subject to the cooldown).
    pub async fn refresh(&self) -> RefreshOutcome {
        let start = Instant::now();
        let outcome = self.fetcher.credentials().force_refresh().await;
        let details = format!("{outcome:?} in {}ms", start.elapsed().as_millis());
        self.record(outcome.is_degraded(), "refresh", None, &details);
        outcome
    }

    async fn fetch_vehicle(&self, regnr: &str) -> Result<VehicleReport> {
        let html = self
            .fetcher
            .fetch(&format!("/fordon/{}/", regnr.to_lowercase()))
            .await?;
        let page = scrape::vehicle_page(&html);
        Ok(VehicleReport {
            regnr: regnr.to_string(),
            page_title: page.page_title,
            data: page.data,
            owner: page.owner,
            mileage_history: page.mileage_history,
        })
    }

    async fn fetch_profile(&self, profile_id: &str) -> Result<OwnerProfile> {
        let path = format!("/brukare/{profile_id}/");
        let html = self.fetcher.fetch(&path).await?;
        let mut profile = scrape::owner_profile(&html);
        profile.profile_id = profile_id.to_string();

        // The full vehicle table is loaded separately by the page.
        let table_path = format!("{path}?handler=vehicles&currentPage=1");
        match self.fetcher.fetch(&table_path).await {
            Ok(fragment) => profile.vehicles = OwnedVehicles::Table(scrape::vehicle_table(&fragment)),
            Err(err) => {
                tracing::debug!(profile_id, error = %err, "vehicle table unavailable, keeping profile links")
            }
        }

        Ok(profile)
    }

    async fn fetch_owner(&self, regnr: &str) -> Result<OwnerReport> {
        let vehicle = self.fetch_vehicle(regnr).await?;
        let Some(current) = vehicle.owner.current_owner else {
            tracing::info!(regnr, "vehicle page has no owner link");
            return Ok(OwnerReport::missing_owner(regnr));
        };
        let profile = self.fetch_profile(&current.profile_id).await?;
        Ok(OwnerReport {
            regnr: regnr.to_string(),
            vehicle_title: Some(vehicle.page_title),
            owner_profile: Some(profile),
            owner_history: Some(vehicle.owner.history),
            error: None,
        })
    }

    async fn timed<T, F>(&self, event: &str, target: &str, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = op.await;
        let ms = start.elapsed().as_millis();
        match &result {
            Ok(_) => {
                tracing::info!(op = event, key = target, ms = ms as u64, "lookup succeeded");
                self.record(false, event, Some(target), &format!("succeeded in {ms}ms"));
            }
            Err(err) => {
                tracing::warn!(op = event, key = target, ms = ms as u64, error = %err, "lookup failed");
                self.record(true, event, Some(target), &format!("failed in {ms}ms: {err}"));
            }
        }
        result
    }

    fn record(&self, failed: bool, event: &str, target: Option<&str>, details: &str) {
        let Some(logger) = &self.activity else {
            return;
        };
        let _ = if failed {
            logger.error(target, event, Some(details))
        } else {
            logger.info(target, event, Some(details))
        };
    }
}

/// Upper-case a registration number and reject anything that is not a bare plate.
pub fn normalize_regnr(raw: &str) -> Result<String> {
    let regnr = raw.trim().to_uppercase();
    if regnr.is_empty()
        || regnr.len() > MAX_REGNR_LEN
        || !regnr.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(BilregError::InvalidInput(format!(
            "invalid registration number {raw:?}"
        )));
    }
    Ok(regnr)
}

pub fn validate_profile_id(raw: &str) -> Result<&str> {
    let id = raw.trim();
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(BilregError::InvalidInput(format!("invalid profile id {raw:?}")));
    }
    Ok(id)
}
