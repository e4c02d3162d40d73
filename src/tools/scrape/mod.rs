//! Scrape Tools
//!
//! Pure HTML → struct extraction for the target site's page layouts. Each
//! entry point parses its document once and returns owned data, so callers
//! never hold a parsed document across an `.await`.

pub mod types;
mod utils;

pub use types::*;
use utils::*;

use scraper::Html;

/// Scrape a vehicle page (`/fordon/{regnr}/`).
pub fn vehicle_page(html: &str) -> VehiclePage {
    let doc = Html::parse_document(html);
    VehiclePage {
        page_title: page_title(&doc),
        data: label_values(&doc),
        owner: owner_from_vehicle(&doc),
        mileage_history: mileage_history(&doc),
    }
}

/// Scrape an owner profile page (`/brukare/{id}/`). `profile_id` is left empty.
pub fn owner_profile(html: &str) -> OwnerProfile {
    let doc = Html::parse_document(html);
    utils::owner_profile(&doc)
}

/// Scrape the vehicle table fragment served by a profile's vehicles handler.
pub fn vehicle_table(html: &str) -> Vec<VehicleRow> {
    let doc = Html::parse_document(&ensure_table(html));
    vehicle_rows(&doc)
}
