//! ZIP record and point types.

use serde::{Deserialize, Serialize};

use crate::config::UNKNOWN_CITY;

/// One row of the ZIP code directory.
///
/// Field names follow the source CSV columns so stored and served JSON keep
/// the same shape as the raw data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRecord {
    /// Five-digit ZIP code, unique within a snapshot
    pub zip: String,
    /// Classification: STANDARD, PO BOX, UNIQUE, MILITARY
    #[serde(rename = "type")]
    pub kind: String,
    pub decommissioned: bool,
    pub primary_city: String,
    pub acceptable_cities: Vec<String>,
    pub unacceptable_cities: Vec<String>,
    pub state: String,
    pub county: String,
    pub timezone: String,
    pub area_codes: Vec<String>,
    pub world_region: String,
    pub country: String,
    /// Degrees, in [-90, 90]
    pub latitude: f64,
    /// Degrees, in [-180, 180]
    pub longitude: f64,
    pub irs_estimated_population: Option<f64>,
}

impl ZipRecord {
    /// Display city: primary city, then the first acceptable city, then "Unknown".
    pub fn city(&self) -> &str {
        if !self.primary_city.is_empty() {
            return &self.primary_city;
        }
        self.acceptable_cities
            .iter()
            .map(String::as_str)
            .find(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CITY)
    }

    /// Coordinate projection of this record, carrying its ZIP code.
    pub fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
            zip: Some(self.zip.clone()),
        }
    }
}

/// Coordinate-only projection of a [`ZipRecord`].
///
/// `zip` links the point back to its record. It is optional on read so that
/// projections stored without it still load; those are resolved by
/// coordinate equality instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            zip: None,
        }
    }

    /// True if both coordinates are finite and within the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
    }
}

/// True if `(lat, long)` is a finite latitude in [-90, 90] and longitude in [-180, 180].
pub(crate) fn is_valid_coordinate(lat: f64, long: f64) -> bool {
    lat.is_finite()
        && long.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&long)
}

/// Normalizes a raw ZIP value to five digits.
///
/// Accepts one to five ASCII digits and restores leading zeros that
/// spreadsheet exports tend to drop ("501" becomes "00501"). Anything else
/// is rejected.
pub fn normalize_zip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{:0>5}", trimmed))
}
