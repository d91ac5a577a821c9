//! # ptime - Islamic Prayer Times
//!
//! ptime computes the daily Islamic prayer times for a location and date,
//! and serves them through a small web page. It provides:
//!
//! - **Astronomy**: Julian day, sun position and hour-angle solving
//! - **Methods**: ISNA, MWL, Egypt, Makkah, Karachi, Tehran and Jafari step tables
//! - **Locations**: coordinate validation and US ZIP centroid lookup
//! - **Overlay**: the earth page renderer, drawable to a PNG on the server
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use ptime::{CalcMethod, Location, times::{self, Prayer}};
//!
//! let date = NaiveDate::from_ymd_opt(2016, 1, 22).unwrap();
//! let loc = Location::new(40.0, -80.0, -5.0);
//!
//! let times = times::gen_times(date, &loc, CalcMethod::Isna);
//! assert_eq!(times.display(Prayer::Sunrise), "07:37");
//!
//! for t in times.sorted() {
//!     println!("{}\t{}", t.prayer.label(), t.display());
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`times`] | Prayer time computation |
//! | [`location`] | Locations, validation and ZIP lookup |
//! | [`overlay`] | Earth page renderer and canvas backends |
//! | [`server`] | HTTP server |
//! | [`error`] | Error types |

pub mod error;
pub mod location;
pub mod overlay;
pub mod server;
pub mod times;

// Re-exports for convenience
pub use error::PtimeError;
pub use location::Location;
pub use times::CalcMethod;
