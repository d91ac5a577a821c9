//! # Prayer Times
//!
//! Computes the eight daily times for a date and [`Location`] under a
//! [`CalcMethod`].
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ptime::location::Location;
//! use ptime::times::{self, CalcMethod, Prayer};
//!
//! let date = NaiveDate::from_ymd_opt(2016, 1, 22).unwrap();
//! let loc = Location::new(40.0, -80.0, -5.0);
//! let times = times::gen_times(date, &loc, CalcMethod::Isna);
//! assert_eq!(times.display(Prayer::Dhuhr), "12:31");
//! ```

pub mod astro;
pub mod method;

pub use method::{CalcMethod, Step};

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

use crate::location::Location;

/// Rounding applied before truncating to whole minutes.
const HALF_MINUTE: f64 = 0.5 / 60.0;

/// The eight times computed each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prayer {
    Dhuhr,
    Fajr,
    Imsak,
    Sunrise,
    Asr,
    Sunset,
    Maghrib,
    Isha,
}

impl Prayer {
    /// Evaluation order. Fajr precedes imsak, maghrib precedes isha.
    pub const ORDER: [Prayer; 8] = [
        Prayer::Dhuhr,
        Prayer::Fajr,
        Prayer::Imsak,
        Prayer::Sunrise,
        Prayer::Asr,
        Prayer::Sunset,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Prayer::Dhuhr => "dhuhr",
            Prayer::Fajr => "fajr",
            Prayer::Imsak => "imsak",
            Prayer::Sunrise => "sunrise",
            Prayer::Asr => "asr",
            Prayer::Sunset => "sunset",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
        }
    }

    /// First guess in hours, used to pick the instant the sun is sampled at.
    fn initial_guess(self) -> f64 {
        match self {
            Prayer::Dhuhr => 12.0,
            Prayer::Fajr | Prayer::Imsak => 5.0,
            Prayer::Sunrise => 6.0,
            Prayer::Asr => 13.0,
            Prayer::Sunset | Prayer::Maghrib | Prayer::Isha => 18.0,
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One computed time.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerTime {
    pub prayer: Prayer,
    /// Fractional hours in the location's zone. NaN if the sun never
    /// reaches the required angle.
    pub time: f64,
    pub step: Step,
}

impl PrayerTime {
    pub fn display(&self) -> String {
        format_time(self.time)
    }
}

/// A day's times, kept in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerTimes(Vec<PrayerTime>);

impl PrayerTimes {
    pub fn get(&self, prayer: Prayer) -> Option<&PrayerTime> {
        self.0.iter().find(|t| t.prayer == prayer)
    }

    /// `HH:MM` for a prayer, `--:--` when undefined.
    pub fn display(&self, prayer: Prayer) -> String {
        self.get(prayer)
            .map(PrayerTime::display)
            .unwrap_or_else(|| format_time(f64::NAN))
    }

    /// Times in chronological order. Undefined times sort last.
    pub fn sorted(&self) -> Vec<&PrayerTime> {
        let mut sorted: Vec<&PrayerTime> = self.0.iter().collect();
        sorted.sort_by(|a, b| match (a.time.is_nan(), b.time.is_nan()) {
            (false, false) => a.time.total_cmp(&b.time),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        sorted
    }

    /// Label to `HH:MM`, the shape the web page consumes.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|t| (t.prayer.label().to_string(), t.display()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrayerTime> {
        self.0.iter()
    }
}

impl fmt::Display for PrayerTimes {
    /// One `label<TAB>HH:MM` line per time, chronologically.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self.sorted() {
            writeln!(f, "{}\t{}", t.prayer, t.display())?;
        }
        Ok(())
    }
}

/// Whole hours and minutes of a fractional hour, both floored.
pub fn hours_minutes(time: f64) -> (i64, i64) {
    let hour = time.floor();
    let minute = ((time - hour) * 60.0).floor();
    (hour as i64, minute as i64)
}

/// Format fractional hours as `HH:MM`, rounded to the nearest minute.
pub fn format_time(time: f64) -> String {
    if !time.is_finite() {
        return "--:--".to_string();
    }
    let (hour, minute) = hours_minutes(astro::fix_hour(time + HALF_MINUTE));
    format!("{:02}:{:02}", hour, minute)
}

/// Compute all eight times for `date` at `loc`.
pub fn gen_times(date: NaiveDate, loc: &Location, method: CalcMethod) -> PrayerTimes {
    let jul = astro::adj_julian(
        astro::julian(date.year(), date.month(), date.day(), 0, 0, 0),
        loc.long,
    );

    let mut dhuhr = 0.0;
    let mut fajr = 0.0;
    let mut maghrib = 0.0;
    let mut times = Vec::with_capacity(Prayer::ORDER.len());

    for (prayer, step) in Prayer::ORDER.into_iter().zip(method.steps()) {
        let jd = jul + prayer.initial_guess() / 24.0;
        let time = match step {
            Step::Dhuhr => {
                dhuhr = astro::dhuhr_time(loc.long, loc.tz, jd);
                dhuhr
            }
            Step::AngleBefore(angle) => {
                astro::time_angle(loc.lat, jd, dhuhr, astro::rad(angle), -1.0)
            }
            Step::AngleAfter(angle) => {
                astro::time_angle(loc.lat, jd, dhuhr, astro::rad(angle), 1.0)
            }
            Step::Asr(factor) => astro::asr_time(loc.lat, jd, dhuhr, factor),
            Step::AfterFajr(minutes) => fajr + minutes / 60.0,
            Step::AfterMaghrib(minutes) => maghrib + minutes / 60.0,
        };

        match prayer {
            Prayer::Fajr => fajr = time,
            Prayer::Maghrib => maghrib = time,
            _ => {}
        }
        times.push(PrayerTime { prayer, time, step });
    }

    log::debug!("{} times for {} at {}: {:?}", method, date, loc, times);
    PrayerTimes(times)
}
