use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Section name → (label → value).
pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Everything read from a single vehicle page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct VehiclePage {
    pub page_title: String,
    pub data: Sections,
    pub owner: VehicleOwner,
    pub mileage_history: Vec<MileageReading>,
}

/// Owner block of a vehicle page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct VehicleOwner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_owner: Option<OwnerLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<OwnerHistoryEntry>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OwnerLink {
    pub name: String,
    pub profile_id: String,
    pub profile_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OwnerHistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    /// person, company, rental, dealer or unknown
    pub owner_class: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// One inspection odometer reading. 1 mil = 10 km.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MileageReading {
    pub date: String,
    pub mileage_mil: u64,
    pub mileage_km: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct VehicleLink {
    pub regnr: String,
    pub description: String,
    pub url: String,
}

/// A row of the owner's vehicle table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct VehicleRow {
    pub regnr: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_acquired: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// An owner's vehicles: links from the profile page, or the richer table rows.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OwnedVehicles {
    Table(Vec<VehicleRow>),
    Links(Vec<VehicleLink>),
}

impl Default for OwnedVehicles {
    fn default() -> Self {
        Self::Links(Vec::new())
    }
}

impl OwnedVehicles {
    pub fn len(&self) -> usize {
        match self {
            Self::Table(rows) => rows.len(),
            Self::Links(links) => links.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything read from an owner profile page.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct OwnerProfile {
    pub profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnummer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub vehicles: OwnedVehicles,
    /// `None` when the page has no "other vehicles at the address" section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_vehicles: Option<Vec<VehicleLink>>,
}
