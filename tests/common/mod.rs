#![allow(dead_code)]

use async_trait::async_trait;
use bilreg::tools::credentials::{CredentialCache, CredentialSet, CredentialSource, SESSION_COOKIE};
use bilreg::tools::fetch::{FetchOptions, PageFetcher};
use bilreg::{Lookup, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const VEHICLE_HTML: &str = include_str!("../fixtures/vehicle.html");
pub const VEHICLE_NO_OWNER_HTML: &str = include_str!("../fixtures/vehicle_no_owner.html");
pub const PROFILE_HTML: &str = include_str!("../fixtures/profile.html");
pub const TABLE_HTML: &str = include_str!("../fixtures/vehicles_table.html");

/// Hands out `session=v1`, `session=v2`, ... and counts harvests.
pub struct CountingSource {
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSource for CountingSource {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn harvest(&self) -> Result<CredentialSet> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CredentialSet::new().with(SESSION_COOKIE, &format!("v{n}")))
    }
}

pub struct Harness {
    pub server: MockServer,
    pub lookup: Arc<Lookup>,
    pub source: Arc<CountingSource>,
}

/// A lookup against a fresh mock site, with seeded credentials.
pub async fn harness() -> Harness {
    let server = MockServer::start().await;
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
    });
    let cache = CredentialCache::new(source.clone())
        .with_cooldown(Duration::from_secs(60))
        .with_seed(CredentialSet::new().with(SESSION_COOKIE, "seed"));
    let options = FetchOptions {
        retry_budget: 1,
        timeout: Duration::from_secs(5),
    };
    let fetcher = PageFetcher::with_options(
        Url::parse(&server.uri()).unwrap(),
        Arc::new(cache),
        options,
    )
    .unwrap();

    Harness {
        server,
        lookup: Arc::new(Lookup::new(fetcher)),
        source,
    }
}

pub async fn mount_page(server: &MockServer, page: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// The profile's vehicles handler; takes precedence over the plain profile mock.
pub async fn mount_vehicle_table(server: &MockServer, profile: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(profile))
        .and(query_param("handler", "vehicles"))
        .and(query_param("currentPage", "1"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Vehicle, profile and vehicle table for XBD134 / a1b2c3.
pub async fn mount_site(server: &MockServer) {
    mount_page(server, "/fordon/xbd134/", 200, VEHICLE_HTML).await;
    mount_page(server, "/brukare/a1b2c3/", 200, PROFILE_HTML).await;
    mount_vehicle_table(server, "/brukare/a1b2c3/", 200, TABLE_HTML).await;
}
