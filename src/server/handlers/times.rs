//! Prayer time API handlers.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::PtimeError,
    location::{self, Location, zcta},
    overlay::format,
    times::{self, CalcMethod, PrayerTimes},
};

use super::super::state::AppState;
use super::error_response;

/// Location fields posted by the page, also accepted as a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationForm {
    #[serde(rename = "Date", alias = "date", default)]
    pub date: Option<String>,
    #[serde(rename = "Zone", alias = "zone", default)]
    pub zone: Option<String>,
    #[serde(rename = "Zipcode", alias = "zipcode", alias = "zip", default)]
    pub zipcode: Option<String>,
    #[serde(rename = "Latitude", alias = "latitude", alias = "lat", default)]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude", alias = "longitude", alias = "long", default)]
    pub longitude: Option<String>,
    #[serde(rename = "Method", alias = "method", default)]
    pub method: Option<String>,
}

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl LocationForm {
    /// Whether any of zip, latitude or longitude was given.
    pub fn has_location(&self) -> bool {
        field(&self.zipcode).is_some()
            || field(&self.latitude).is_some()
            || field(&self.longitude).is_some()
    }

    /// `YYYY/M/D`, defaulting to today.
    pub fn date(&self) -> Result<NaiveDate, PtimeError> {
        match field(&self.date) {
            Some(d) => NaiveDate::parse_from_str(d, "%Y/%m/%d")
                .map_err(|_| PtimeError::InvalidDate(d.to_string())),
            None => Ok(Local::now().date_naive()),
        }
    }

    /// Hours east of UTC, defaulting to the server's offset.
    pub fn zone(&self) -> Result<f64, PtimeError> {
        let tz = match field(&self.zone) {
            Some(z) => z
                .parse::<f64>()
                .map_err(|_| PtimeError::InvalidZone(z.to_string()))?,
            None => format::zone_hours(&Local::now()),
        };
        if !location::valid_zone(tz) {
            return Err(PtimeError::InvalidZone(tz.to_string()));
        }
        Ok(tz)
    }

    pub fn method(&self, default: CalcMethod) -> Result<CalcMethod, PtimeError> {
        field(&self.method).map_or(Ok(default), |m| m.parse())
    }

    /// Parsed coordinates if both are numbers in range.
    fn coordinates(&self) -> Option<(f64, f64)> {
        let lat: f64 = field(&self.latitude)?.parse().ok()?;
        let long: f64 = field(&self.longitude)?.parse().ok()?;
        (location::valid_latitude(lat) && location::valid_longitude(long)).then_some((lat, long))
    }

    /// A valid ZIP code wins over coordinates.
    pub fn location(&self, zcta_path: &Path) -> Result<Location, PtimeError> {
        let tz = self.zone()?;
        if let Some(zip) = field(&self.zipcode).filter(|z| location::valid_zip(z)) {
            let coords = zcta::lookup(zcta_path, zip).inspect_err(|e| {
                if let PtimeError::Io(io) = e {
                    log::warn!("zcta file {}: {}", zcta_path.display(), io);
                }
            })?;
            log::info!("valid zip {}", zip);
            return Ok(Location::from_coordinates(coords, tz));
        }
        match self.coordinates() {
            Some((lat, long)) => {
                log::info!("valid coordinates {}, {}", lat, long);
                Ok(Location::new(lat, long, tz))
            }
            None => Err(PtimeError::InvalidLocation("Invalid coordinates".to_string())),
        }
    }

    /// Resolve everything and compute the day's times.
    pub fn prayer_times(&self, state: &AppState) -> Result<PrayerTimes, PtimeError> {
        let date = self.date()?;
        let method = self.method(state.config.method)?;
        let loc = self.location(&state.config.zcta_path)?;
        log::debug!("{} {} {}", date, loc, method);
        Ok(times::gen_times(date, &loc, method))
    }

    /// Like [`prayer_times`](Self::prayer_times) but off the async runtime,
    /// since ZIP lookups read a file.
    pub async fn prayer_times_blocking(
        self,
        state: Arc<AppState>,
    ) -> Result<PrayerTimes, PtimeError> {
        tokio::task::spawn_blocking(move || self.prayer_times(&state))
            .await
            .map_err(|e| PtimeError::Server(format!("Task error: {}", e)))?
    }
}

/// POST / - compute times for the submitted form.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LocationForm>,
) -> Response {
    log::info!("form {:?}", form);
    match form.prayer_times_blocking(state).await {
        Ok(times) => Json(times.to_map()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/methods - List calculation method names.
pub async fn methods() -> Json<Vec<&'static str>> {
    Json(CalcMethod::ALL.iter().map(|m| m.name()).collect())
}
