//! # Locations
//!
//! Geographic coordinates, the observer [`Location`] used by the time
//! calculation, and resolution of user input (coordinates or a ZIP code)
//! into a location.

pub mod zcta;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::PtimeError;

/// A position as reported by a geolocation provider, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        valid_latitude(self.latitude) && valid_longitude(self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Observer position plus the UTC offset the times are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
    /// UTC offset in hours.
    pub tz: f64,
}

impl Location {
    pub fn new(lat: f64, long: f64, tz: f64) -> Self {
        Self { lat, long, tz }
    }

    pub fn from_coordinates(coords: Coordinates, tz: f64) -> Self {
        Self::new(coords.latitude, coords.longitude, tz)
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.long)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) UTC{:+}", self.lat, self.long, self.tz)
    }
}

pub fn valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat)
}

pub fn valid_longitude(long: f64) -> bool {
    (-180.0..=180.0).contains(&long)
}

/// UTC offsets in use run from -12 to +14.
pub fn valid_zone(tz: f64) -> bool {
    (-12.0..=14.0).contains(&tz)
}

/// Exactly five ASCII digits.
pub fn valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

/// Unvalidated location input, as given on the command line or in a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationQuery {
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub zip: Option<String>,
    pub tz: f64,
}

impl LocationQuery {
    /// Resolve against the ZCTA file at `zcta_path`.
    pub fn resolve(&self, zcta_path: &Path) -> Result<Location, PtimeError> {
        self.resolve_with(|zip| zcta::lookup(zcta_path, zip))
    }

    /// Validate the query and resolve a ZIP code through `lookup`.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Location, PtimeError>
    where
        F: FnOnce(&str) -> Result<Coordinates, PtimeError>,
    {
        let invalid = |msg: String| Err(PtimeError::InvalidLocation(msg));
        let zip = self.zip.as_deref().map(str::trim).filter(|z| !z.is_empty());

        match (self.lat, self.long, zip) {
            (None, None, None) => return invalid("No location defined".to_string()),
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => {
                return invalid("Conflicting coordinates and zip".to_string());
            }
            (None, Some(_), None) => return invalid("Missing latitude".to_string()),
            (Some(_), None, None) => return invalid("Missing longitude".to_string()),
            _ => {}
        }

        if let Some(lat) = self.lat.filter(|l| !valid_latitude(*l)) {
            return invalid(format!("Invalid latitude, {}", lat));
        }
        if let Some(long) = self.long.filter(|l| !valid_longitude(*l)) {
            return invalid(format!("Invalid longitude, {}", long));
        }
        if !valid_zone(self.tz) {
            return Err(PtimeError::InvalidZone(self.tz.to_string()));
        }

        match (self.lat, self.long, zip) {
            (Some(lat), Some(long), _) => Ok(Location::new(lat, long, self.tz)),
            (_, _, Some(zip)) if valid_zip(zip) => {
                let coords = lookup(zip)?;
                Ok(Location::from_coordinates(coords, self.tz))
            }
            (_, _, Some(zip)) => invalid(format!("Invalid zip, {}", zip)),
            _ => invalid("No location defined".to_string()),
        }
    }
}
