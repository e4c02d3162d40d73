use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;

use super::types::*;
use crate::selectors::*;

const TITLE_SUFFIX: &str = " - Biluppgifter.se";

/// Values that are call-to-action links rather than data.
const PROMO_PREFIXES: [&str; 3] = ["Hämta ", "Jämför ", "Räkna "];

const OWNER_CLASSES: [&str; 4] = ["person", "company", "rental", "dealer"];

static MILEAGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\d\s]+)\s*mil(\d{4}-\d{2}-\d{2})").expect("valid regex")
});
static POSTAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5})\s+(.+)$").expect("valid regex"));
static PERSON_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?), en (\w+) som är (\d+) år.+bor i (.+?),").expect("valid regex")
});
static PERSONNUMMER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{8}-\d{4})").expect("valid regex"));
static REGNR_HREF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/fordon/([a-zA-Z0-9]+)").expect("valid regex"));
static YEAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}(-\d{2})?$").expect("valid regex"));

/// Text content with every text node trimmed and concatenated.
pub(super) fn text_of(el: ElementRef) -> String {
    el.text().map(str::trim).collect()
}

/// Text content with runs of whitespace collapsed, for prose paragraphs.
fn prose_of(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(el: ElementRef, selector: &scraper::Selector) -> Option<String> {
    el.select(selector).next().map(text_of)
}

/// Last path segment of a profile href: `/brukare/abc123/` → `abc123`.
pub(super) fn profile_id_from_href(href: &str) -> String {
    href.trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn regnr_from_href(href: &str) -> Option<String> {
    REGNR_HREF_REGEX
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
}

pub(super) fn page_title(doc: &Html) -> String {
    doc.select(&TITLE)
        .next()
        .map(|t| text_of(t).replace(TITLE_SUFFIX, "").trim().to_string())
        .unwrap_or_default()
}

pub(super) fn label_values(doc: &Html) -> Sections {
    let mut sections = BTreeMap::new();

    for section in doc.select(&SECTION) {
        let name = first_text(section, &H2)
            .or_else(|| section.value().id().map(str::to_string))
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        let mut values = BTreeMap::new();
        for li in section.select(&LI) {
            let (Some(label), Some(value)) = (first_text(li, &LABEL), first_text(li, &VALUE))
            else {
                continue;
            };
            if label.is_empty() || value.is_empty() {
                continue;
            }
            if PROMO_PREFIXES.iter().any(|p| value.starts_with(p)) {
                continue;
            }
            values.insert(label, value);
        }

        if !values.is_empty() {
            sections.insert(name, values);
        }
    }

    sections
}

pub(super) fn owner_from_vehicle(doc: &Html) -> VehicleOwner {
    let Some(section) = doc.select(&OWNER_HISTORY).next() else {
        return VehicleOwner::default();
    };

    let mut owner = VehicleOwner::default();

    if let Some(intro) = section.select(&P).next() {
        owner.summary = Some(prose_of(intro));

        if let Some(link) = intro.select(&PROFILE_LINK).next() {
            let href = link.value().attr("href").unwrap_or_default();
            let city = intro
                .select(&EM)
                .map(text_of)
                .filter_map(|t| t.strip_prefix("från ").map(str::to_string))
                .last();
            owner.current_owner = Some(OwnerLink {
                name: text_of(link),
                profile_id: profile_id_from_href(href),
                profile_url: href.to_string(),
                city,
            });
        }
    }

    for li in section.select(&CLASSED_LI) {
        let owner_class = li
            .value()
            .classes()
            .find(|c| OWNER_CLASSES.contains(c))
            .unwrap_or("unknown")
            .to_string();

        let Some(info) = li.select(&INFO_DIV).next() else {
            continue;
        };
        let Some(h3) = info.select(&H3).next() else {
            continue;
        };

        let date = first_text(h3, &NUMB_SPAN).unwrap_or_default();
        let heading = text_of(h3);
        let kind = if date.is_empty() {
            heading
        } else {
            heading.replace(&date, "")
        };

        let mut entry = OwnerHistoryEntry {
            kind: kind.trim().to_string(),
            owner_class,
            date,
            name: None,
            profile_id: None,
            profile_url: None,
            details: None,
        };

        if let Some(p) = info.select(&P).next() {
            if let Some(link) = p.select(&PROFILE_LINK).next() {
                let href = link.value().attr("href").unwrap_or_default();
                entry.name = Some(text_of(link));
                entry.profile_id = Some(profile_id_from_href(href));
                entry.profile_url = Some(href.to_string());
            }
            entry.details = Some(prose_of(p));
        }

        owner.history.push(entry);
    }

    owner
}

pub(super) fn mileage_history(doc: &Html) -> Vec<MileageReading> {
    let Some(section) = doc.select(&METER_HISTORY).next() else {
        return Vec::new();
    };

    section
        .select(&H3)
        .filter(|h3| text_of(*h3).starts_with("Besiktning"))
        .filter_map(|h3| first_text(h3, &NUMB_SPAN))
        .filter_map(|span_text| {
            let caps = MILEAGE_REGEX.captures(&span_text)?;
            let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
            let mileage_mil = digits.parse::<u64>().ok()?;
            Some(MileageReading {
                date: caps[2].to_string(),
                mileage_mil,
                mileage_km: mileage_mil * 10,
                kind: "besiktning".to_string(),
            })
        })
        .collect()
}

pub(super) fn vehicle_links(el: ElementRef) -> Vec<VehicleLink> {
    el.select(&VEHICLE_LINK)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let regnr = regnr_from_href(href)?;
            let description = text_of(a);
            if description.is_empty() {
                return None;
            }
            Some(VehicleLink {
                regnr,
                description,
                url: href.to_string(),
            })
        })
        .collect()
}

pub(super) fn owner_profile(doc: &Html) -> OwnerProfile {
    let mut profile = OwnerProfile::default();

    for action_box in doc.select(&ACTION_BOX) {
        let Some(label) = first_text(action_box, &STRONG) else {
            continue;
        };
        match label.to_lowercase().as_str() {
            "adress" => {
                let paragraphs: Vec<String> = action_box.select(&P).map(text_of).collect();
                if let Some(street) = paragraphs.first() {
                    profile.address = Some(street.clone());
                }
                if let Some(caps) = paragraphs.get(1).and_then(|p| POSTAL_REGEX.captures(p)) {
                    profile.postal_code = Some(caps[1].to_string());
                    profile.postal_city = Some(caps[2].to_string());
                }
            }
            "telefon" => {
                if let Some(phone) = first_text(action_box, &P) {
                    if !phone.is_empty() && !phone.to_lowercase().contains("inga") {
                        profile.phone = Some(phone);
                    }
                }
            }
            _ => {}
        }
    }

    for section in doc.select(&SECTION) {
        let section_text = text_of(section);
        if ["privatperson", "bor i", "år gammal"]
            .iter()
            .any(|marker| section_text.contains(marker))
        {
            read_person_paragraphs(section, &mut profile);
        }

        let heading = first_text(section, &H2).unwrap_or_default().to_lowercase();
        if heading.contains("fordon") && !heading.contains("andra") {
            profile.vehicles = OwnedVehicles::Links(vehicle_links(section));
        }
        if heading.contains("andra fordon") {
            let none_listed = first_text(section, &P)
                .map(|t| t.to_lowercase().contains("inga"))
                .unwrap_or(false);
            profile.address_vehicles = Some(if none_listed {
                Vec::new()
            } else {
                vehicle_links(section)
            });
        }
    }

    profile
}

fn read_person_paragraphs(section: ElementRef, profile: &mut OwnerProfile) {
    for p in section.select(&P) {
        let text = text_of(p);

        if let Some(caps) = PERSON_REGEX.captures(&text) {
            profile.name = Some(caps[1].to_string());
            profile.person_type = Some(caps[2].to_string());
            profile.age = caps[3].parse().ok();
            profile.city = Some(caps[4].to_string());
            continue;
        }

        if let Some(caps) = PERSONNUMMER_REGEX.captures(&text) {
            profile.personnummer = Some(caps[1].to_string());
        }
    }
}

/// Row fragments are wrapped in a table, otherwise the HTML parser drops them.
pub(super) fn ensure_table(html: &str) -> String {
    if html.to_ascii_lowercase().contains("<table") {
        html.to_string()
    } else {
        format!("<table>{html}</table>")
    }
}

pub(super) fn vehicle_rows(doc: &Html) -> Vec<VehicleRow> {
    let mut rows = Vec::new();

    for row in doc.select(&CLASSED_TR) {
        let cells: Vec<ElementRef> = row.select(&TD).collect();
        if cells.is_empty() {
            continue;
        }
        let Some(link) = row.select(&VEHICLE_LINK).next() else {
            continue;
        };

        let mut entry = VehicleRow {
            regnr: link
                .value()
                .attr("href")
                .and_then(regnr_from_href)
                .unwrap_or_default(),
            model: text_of(link),
            ..VehicleRow::default()
        };

        for td in &cells {
            let text = text_of(*td);

            if td.value().classes().any(|c| c == "mono") {
                entry.regnr = text.to_uppercase();
            }
            if td.select(&COLOR_DIV).next().is_some() {
                entry.color = Some(text.clone());
            }
            if YEAR_REGEX.is_match(&text) {
                entry.year = text.parse().ok();
            }
            if DATE_REGEX.is_match(&text) {
                entry.date_acquired = Some(text);
            } else if text.contains("år sedan") || text.contains("mån sedan") {
                entry.ownership_time = Some(text);
            }
        }

        let classes: Vec<&str> = row.value().classes().collect();
        entry.status = if classes.contains(&"itrafik") {
            Some("I Trafik".to_string())
        } else if classes.contains(&"avregistrerad") {
            Some("Avregistrerad".to_string())
        } else if classes.contains(&"avstalld") {
            Some("Avställd".to_string())
        } else {
            None
        };

        rows.push(entry);
    }

    rows
}
