//! Solar geometry used by the prayer time steps.
//!
//! All angles are degrees unless a function says otherwise, and all
//! times are fractional hours.

use std::f64::consts::PI;

/// Julian day number of 2000-01-01 12:00 TT.
const J2000: f64 = 2451545.0;

/// Wrap `num` into `[0, den)`.
pub fn fix(num: f64, den: f64) -> f64 {
    let num = num - den * (num / den).floor();
    if num < 0.0 { num + den } else { num }
}

pub fn fix_angle(deg: f64) -> f64 {
    fix(deg, 360.0)
}

pub fn fix_hour(hr: f64) -> f64 {
    fix(hr, 24.0)
}

pub fn rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

pub fn deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Julian date of a civil calendar instant (Meeus, chapter 7).
pub fn julian(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> f64 {
    let mut year = year as f64;
    let mut month = month as f64;
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    let jd = (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day as f64 + b
        - 1524.5;
    let mins = hour as f64 * 60.0 + minute as f64 + second as f64 / 60.0;
    jd + mins / 1440.0
}

/// Shift a Julian date to the observer's local mean time.
pub fn adj_julian(jul: f64, longitude: f64) -> f64 {
    jul - longitude / (24.0 * 15.0)
}

/// Equation of time (hours) and solar declination (degrees) at `jd`.
pub fn sun_position(jd: f64) -> (f64, f64) {
    let d = jd - J2000;
    let g = fix_angle(357.529 + 0.98560028 * d);
    let q = fix_angle(280.459 + 0.98564736 * d);
    let l = fix_angle(q + 1.915 * rad(g).sin() + 0.020 * (2.0 * rad(g)).sin());

    let e = 23.439 - 0.00000036 * d;

    let ra = deg((rad(e).cos() * rad(l).sin()).atan2(rad(l).cos())) / 15.0;
    // q and RA wrap at different moments around the March equinox.
    let eqt = fix(q / 15.0 - fix_hour(ra) + 12.0, 24.0) - 12.0;
    let decl = deg((rad(e).sin() * rad(l).sin()).asin());
    (eqt, decl)
}

/// Solar noon in the location's zone.
pub fn dhuhr_time(longitude: f64, tz: f64, jd: f64) -> f64 {
    let (eqt, _) = sun_position(jd);
    12.0 + tz - longitude / 15.0 - eqt
}

/// Time at which the sun reaches `angle` (radians, below the horizon when
/// positive), `dir` = -1 before dhuhr and 1 after.
///
/// Returns NaN when the sun never reaches the angle on that day.
pub fn time_angle(latitude: f64, jd: f64, dhuhr: f64, angle: f64, dir: f64) -> f64 {
    let (_, decl) = sun_position(jd);
    let lat = rad(latitude);
    let decl = rad(decl);
    let cos_h = (-angle.sin() - lat.sin() * decl.sin()) / (lat.cos() * decl.cos());
    dhuhr + dir * (deg(cos_h.acos()) / 15.0)
}

/// Afternoon time at which an object's shadow is `factor` times its length
/// plus its noon shadow.
pub fn asr_time(latitude: f64, jd: f64, dhuhr: f64, factor: f64) -> f64 {
    let (_, decl) = sun_position(jd);
    let angle = -(1.0 / (factor + rad((latitude - decl).abs()).tan())).atan();
    let time = time_angle(latitude, jd, dhuhr, angle, 1.0);
    log::trace!("asr angle {} time {}", angle, time);
    time
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_wraps_into_range() {
        assert_eq!(fix(370.0, 360.0), 10.0);
        assert_eq!(fix(-10.0, 360.0), 350.0);
        assert_eq!(fix_hour(25.5), 1.5);
        assert_eq!(fix_hour(-0.5), 23.5);
    }

    #[test]
    fn test_julian_epoch() {
        assert_eq!(julian(2000, 1, 1, 12, 0, 0), J2000);
    }

    #[test]
    fn test_julian_january_uses_previous_year() {
        assert_eq!(julian(2016, 1, 22, 0, 0, 0), 2457409.5);
    }

    #[test]
    fn test_adj_julian_west_is_later() {
        let jd = julian(2016, 1, 22, 0, 0, 0);
        assert!(adj_julian(jd, -80.0) > jd);
        assert!((adj_julian(jd, -80.0) - jd - 80.0 / 360.0).abs() < 1e-8);
    }

    #[test]
    fn test_declination_near_solstices() {
        let (_, june) = sun_position(julian(2016, 6, 21, 12, 0, 0));
        let (_, december) = sun_position(julian(2016, 12, 21, 12, 0, 0));
        assert!((june - 23.44).abs() < 0.1, "june declination {}", june);
        assert!((december + 23.44).abs() < 0.1, "december declination {}", december);
    }

    #[test]
    fn test_equation_of_time_is_small() {
        for month in 1..=12 {
            let (eqt, _) = sun_position(julian(2016, month, 15, 12, 0, 0));
            assert!(eqt.abs() < 0.3, "month {} eqt {}", month, eqt);
        }
    }

    #[test]
    fn test_equation_of_time_across_equinox_wrap() {
        for day in 18..=24 {
            let (eqt, _) = sun_position(julian(2016, 3, day, 0, 0, 0));
            assert!(eqt.abs() < 0.3, "march {} eqt {}", day, eqt);
        }
    }

    #[test]
    fn test_time_angle_is_nan_in_polar_night() {
        let jd = julian(2016, 12, 21, 0, 0, 0);
        let t = time_angle(80.0, jd, 12.0, rad(0.833), -1.0);
        assert!(t.is_nan());
    }
}
