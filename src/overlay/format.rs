//! String forms written into the page's input fields.

use chrono::{DateTime, Datelike, Offset, TimeZone};

/// Characters kept from a coordinate before it is written to an input.
pub const COORDINATE_CHARS: usize = 9;

/// Number to string the way a browser host prints it: shortest round-trip
/// digits, exponent form below 1e-6 and from 1e21 up.
pub fn host_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    // Rust prints `1e21` and `1e-7`; hosts print `1e+21` and `1e-7`.
    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// The text written into a latitude or longitude input.
pub fn coordinate_field(value: f64) -> String {
    truncate_chars(&host_number(value), COORDINATE_CHARS)
}

/// `YYYY/M/D`, unpadded.
pub fn date_field<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!("{}/{}/{}", now.year(), now.month(), now.day())
}

/// Hours east of UTC, negated minutes-behind divided by sixty.
pub fn zone_hours<Tz: TimeZone>(now: &DateTime<Tz>) -> f64 {
    let behind_minutes = -(now.offset().fix().local_minus_utc() as f64) / 60.0;
    -behind_minutes / 60.0
}

pub fn zone_field<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    host_number(zone_hours(now))
}
