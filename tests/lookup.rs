mod common;

use bilreg::tools::credentials::RefreshOutcome;
use bilreg::tools::fetch::FetchError;
use bilreg::tools::scrape::OwnedVehicles;
use bilreg::{BilregError, MISSING_OWNER_MESSAGE};
use common::*;

#[tokio::test]
async fn vehicle_lookup_uppercases_and_lowercases_path() {
    let h = harness().await;
    mount_site(&h.server).await;

    let report = h.lookup.vehicle("xbd134").await.unwrap();
    assert_eq!(report.regnr, "XBD134");
    assert_eq!(report.page_title, "XBD134 - Volvo V70");
    assert_eq!(report.data["Fordonsdata"]["Märke"], "Volvo");
    assert_eq!(report.mileage_history.len(), 2);
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn profile_vehicles_come_from_table_handler() {
    let h = harness().await;
    mount_site(&h.server).await;

    let profile = h.lookup.owner_profile("a1b2c3").await.unwrap();
    assert_eq!(profile.profile_id, "a1b2c3");
    assert_eq!(profile.name.as_deref(), Some("Anna Svensson"));

    let OwnedVehicles::Table(rows) = &profile.vehicles else {
        panic!("expected table rows, got {:?}", profile.vehicles);
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].status.as_deref(), Some("I Trafik"));
}

#[tokio::test]
async fn failed_table_handler_keeps_profile_links() {
    let h = harness().await;
    mount_page(&h.server, "/brukare/a1b2c3/", 200, PROFILE_HTML).await;
    mount_vehicle_table(&h.server, "/brukare/a1b2c3/", 500, "").await;

    let profile = h.lookup.owner_profile("a1b2c3").await.unwrap();
    let OwnedVehicles::Links(links) = &profile.vehicles else {
        panic!("expected profile links, got {:?}", profile.vehicles);
    };
    assert_eq!(links.len(), 2);
}

#[tokio::test]
async fn owner_by_regnr_follows_the_owner_link() {
    let h = harness().await;
    mount_site(&h.server).await;

    let report = h.lookup.owner_by_regnr("XBD134").await.unwrap();
    assert_eq!(report.regnr, "XBD134");
    assert_eq!(report.vehicle_title.as_deref(), Some("XBD134 - Volvo V70"));
    assert_eq!(report.error, None);
    let profile = report.owner_profile.expect("owner profile");
    assert_eq!(profile.profile_id, "a1b2c3");
    assert_eq!(profile.personnummer.as_deref(), Some("19800101-1234"));
    assert_eq!(report.owner_history.map(|h| h.len()), Some(3));
}

#[tokio::test]
async fn owner_by_regnr_without_owner_link_reports_error() {
    let h = harness().await;
    mount_page(&h.server, "/fordon/abc123/", 200, VEHICLE_NO_OWNER_HTML).await;

    let report = h.lookup.owner_by_regnr("abc123").await.unwrap();
    assert_eq!(report.regnr, "ABC123");
    assert_eq!(report.error.as_deref(), Some(MISSING_OWNER_MESSAGE));
    assert!(report.owner_profile.is_none());
    assert!(report.owner_history.is_none());
}

#[tokio::test]
async fn address_lookup_without_owner_link_is_empty() {
    let h = harness().await;
    mount_page(&h.server, "/fordon/abc123/", 200, VEHICLE_NO_OWNER_HTML).await;

    let report = h.lookup.address_vehicles("ABC123").await.unwrap();
    assert_eq!(report.regnr, "ABC123");
    assert_eq!(report.owner, "");
    assert_eq!(report.address, "");
    assert_eq!(report.postal_code, "");
    assert_eq!(report.postal_city, "");
    assert!(report.owner_vehicles.is_empty());
    assert!(report.address_vehicles.is_empty());
}

#[tokio::test]
async fn address_lookup_flattens_the_owner_profile() {
    let h = harness().await;
    mount_site(&h.server).await;

    let report = h.lookup.address_vehicles("XBD134").await.unwrap();
    assert_eq!(report.owner, "Anna Svensson");
    assert_eq!(report.address, "Storgatan 1");
    assert_eq!(report.postal_code, "75320");
    assert_eq!(report.postal_city, "Uppsala");
    assert_eq!(report.owner_vehicles.len(), 2);
    assert_eq!(report.address_vehicles.len(), 1);
    assert_eq!(report.address_vehicles[0].regnr, "DEF456");
}

#[tokio::test]
async fn forbidden_propagates_after_one_refresh() {
    let h = harness().await;
    mount_page(&h.server, "/fordon/xbd134/", 403, "blocked").await;

    let err = h.lookup.vehicle("XBD134").await.unwrap_err();
    assert!(matches!(err, BilregError::Fetch(FetchError::Forbidden)), "{err:?}");
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn invalid_regnr_never_reaches_the_site() {
    let h = harness().await;

    let err = h.lookup.vehicle("../admin").await.unwrap_err();
    assert!(matches!(err, BilregError::InvalidInput(_)), "{err:?}");
    let requests = h.server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn manual_refresh_then_cooldown() {
    let h = harness().await;

    assert_eq!(
        h.lookup.refresh().await,
        RefreshOutcome::Refreshed { cookies: 1 }
    );
    assert!(matches!(
        h.lookup.refresh().await,
        RefreshOutcome::Skipped { .. }
    ));
    assert_eq!(h.source.calls(), 1);
}
