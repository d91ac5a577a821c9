//! ZIP code centroids from a ZCTA file.
//!
//! The file is the one shipped with weather-util. Each record opens with a
//! `[ZIP]` header line followed by a centroid line holding radians:
//!
//! ```text
//! [15213]
//! centroid = (0.7033530103, -1.4027042640)
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::PtimeError;
use crate::times::astro::deg;

use super::Coordinates;

/// Default location of the weather-util ZCTA file.
pub const DEFAULT_ZCTA_PATH: &str = "/usr/share/weather-util/zctas";

/// Parse a `(lat, long)` pair of radians into degrees.
fn parse_centroid(line: &str) -> Option<Coordinates> {
    let open = line.find('(')?;
    let close = line[open..].find(')')? + open;
    let (lat, long) = line[open + 1..close].split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let long: f64 = long.trim().parse().ok()?;
    Some(Coordinates::new(deg(lat), deg(long)))
}

fn is_header(line: &str, zip: &str) -> bool {
    line.contains(&format!("[{}]", zip))
}

/// Look up a ZIP code in any line source.
pub fn lookup_lines<R: BufRead>(reader: R, zip: &str) -> Result<Coordinates, PtimeError> {
    let mut in_record = false;
    for line in reader.lines() {
        let line = line?;
        if in_record {
            if line.trim_start().starts_with('[') {
                break;
            }
            if let Some(coords) = parse_centroid(&line) {
                return Ok(coords);
            }
        } else if is_header(&line, zip) {
            in_record = true;
        }
    }
    Err(PtimeError::ZipNotFound(zip.to_string()))
}

/// Look up a ZIP code in the file at `path`.
pub fn lookup(path: impl AsRef<Path>, zip: &str) -> Result<Coordinates, PtimeError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let coords = lookup_lines(BufReader::new(file), zip)?;
    log::debug!("zip {} -> {} ({})", zip, coords, path.display());
    Ok(coords)
}
