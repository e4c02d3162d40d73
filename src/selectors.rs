//! Shared Selectors

use once_cell::sync::Lazy;
use scraper::Selector;

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// Selector for `<title>` tags.
pub static TITLE: Lazy<Selector> = Lazy::new(|| sel("title"));

pub static SECTION: Lazy<Selector> = Lazy::new(|| sel("section"));
pub static H2: Lazy<Selector> = Lazy::new(|| sel("h2"));
pub static H3: Lazy<Selector> = Lazy::new(|| sel("h3"));
pub static P: Lazy<Selector> = Lazy::new(|| sel("p"));
pub static LI: Lazy<Selector> = Lazy::new(|| sel("li"));
pub static EM: Lazy<Selector> = Lazy::new(|| sel("em"));
pub static STRONG: Lazy<Selector> = Lazy::new(|| sel("strong"));

/// Label/value pairs inside data sections.
pub static LABEL: Lazy<Selector> = Lazy::new(|| sel("span.label"));
pub static VALUE: Lazy<Selector> = Lazy::new(|| sel("span.value"));

/// Owner history block on a vehicle page.
pub static OWNER_HISTORY: Lazy<Selector> = Lazy::new(|| sel("section#owner-history"));
/// Odometer history block on a vehicle page.
pub static METER_HISTORY: Lazy<Selector> = Lazy::new(|| sel("section#meter-history"));
pub static CLASSED_LI: Lazy<Selector> = Lazy::new(|| sel("li[class]"));
pub static INFO_DIV: Lazy<Selector> = Lazy::new(|| sel("div.info"));
pub static NUMB_SPAN: Lazy<Selector> = Lazy::new(|| sel("span.numb"));

/// Links to owner profiles and vehicle pages.
pub static PROFILE_LINK: Lazy<Selector> = Lazy::new(|| sel(r#"a[href*="/brukare/"]"#));
pub static VEHICLE_LINK: Lazy<Selector> = Lazy::new(|| sel(r#"a[href*="/fordon/"]"#));

/// Address/phone boxes on an owner profile.
pub static ACTION_BOX: Lazy<Selector> = Lazy::new(|| sel("div.action-box"));

/// Vehicle table rows returned by the profile's vehicles handler.
pub static CLASSED_TR: Lazy<Selector> = Lazy::new(|| sel("tr[class]"));
pub static TD: Lazy<Selector> = Lazy::new(|| sel("td"));
pub static COLOR_DIV: Lazy<Selector> = Lazy::new(|| sel("div.color"));
