//! Server state and configuration.

use ab_glyph::FontArc;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PtimeError;
use crate::overlay::raster::{self, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::times::CalcMethod;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:4040")
    pub listen_addr: String,
    /// Directory holding `img/earthViz.png`
    pub assets_dir: PathBuf,
    /// ZCTA centroid file used for ZIP lookups
    pub zcta_path: PathBuf,
    /// Method used when a request does not name one
    pub method: CalcMethod,
    /// Optional TrueType font for server-side overlay text
    pub font_path: Option<PathBuf>,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4040".to_string(),
            assets_dir: PathBuf::from("www"),
            zcta_path: PathBuf::from(crate::location::zcta::DEFAULT_ZCTA_PATH),
            method: CalcMethod::default(),
            font_path: None,
            canvas_width: DEFAULT_WIDTH,
            canvas_height: DEFAULT_HEIGHT,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub font: Option<FontArc>,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, PtimeError> {
        let font = config
            .font_path
            .as_deref()
            .map(raster::load_font)
            .transpose()?;
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Ok(Self {
            config,
            font,
            boot_time,
        })
    }
}
