//! # ptime CLI
//!
//! Command-line interface for prayer times.
//!
//! ## Usage
//!
//! ```bash
//! # Times for coordinates, today, in UTC-5
//! ptime times --lat 40 --long -80 --tz -5
//!
//! # Times for a ZIP code on a given day
//! ptime times --zip 15213 --tz -5 --date 01/22/2016
//!
//! # Render the earth overlay to a PNG
//! ptime render --assets ./www --out earth.png --lat 40 --long -80 --tz -5
//!
//! # Run the web server
//! ptime serve --listen 0.0.0.0:4040
//! ```

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use ptime::{
    CalcMethod, Location, PtimeError,
    location::{LocationQuery, zcta::DEFAULT_ZCTA_PATH},
    overlay::{
        self, PageVariant, RasterCanvas,
        providers::FileImageLoader,
        raster::{self, DEFAULT_HEIGHT, DEFAULT_WIDTH},
    },
    server::{self, ServerConfig},
    times,
};

/// ptime - Islamic prayer times
#[derive(Parser, Debug)]
#[command(name = "ptime")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where and when to compute times.
#[derive(Args, Debug)]
struct LocationArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    long: Option<f64>,

    /// US ZIP code, looked up in the ZCTA file
    #[arg(long)]
    zip: Option<String>,

    /// Hours east of UTC (defaults to the local offset)
    #[arg(long, allow_negative_numbers = true)]
    tz: Option<f64>,

    /// Date as MM/DD/YYYY (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Calculation method
    #[arg(long, default_value = "isna")]
    method: CalcMethod,

    /// ZCTA centroid file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ZCTA_PATH)]
    zcta: PathBuf,
}

impl LocationArgs {
    fn has_location(&self) -> bool {
        self.lat.is_some() || self.long.is_some() || self.zip.is_some()
    }

    fn date(&self) -> Result<NaiveDate, PtimeError> {
        match &self.date {
            Some(d) => NaiveDate::parse_from_str(d, "%m/%d/%Y")
                .map_err(|_| PtimeError::InvalidDate(d.clone())),
            None => Ok(Local::now().date_naive()),
        }
    }

    fn location(&self) -> Result<Location, PtimeError> {
        let query = LocationQuery {
            lat: self.lat,
            long: self.long,
            zip: self.zip.clone(),
            tz: self
                .tz
                .unwrap_or_else(|| overlay::format::zone_hours(&Local::now())),
        };
        query.resolve(&self.zcta)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the day's prayer times
    Times {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Run the earth page renderer and save the canvas as PNG
    Render {
        /// Directory holding img/earthViz.png
        #[arg(long, value_name = "DIR")]
        assets: PathBuf,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Page script to emulate
        #[arg(long, value_enum, default_value = "updated")]
        variant: PageVariant,

        /// TrueType font for the overlaid times (built-in bitmap font otherwise)
        #[arg(long, value_name = "TTF")]
        font: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Start HTTP server for the prayer times page
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:4040")]
        listen: String,

        /// Directory holding img/earthViz.png
        #[arg(long, value_name = "DIR", default_value = "www")]
        assets: PathBuf,

        /// ZCTA centroid file
        #[arg(long, value_name = "PATH", default_value = DEFAULT_ZCTA_PATH)]
        zcta: PathBuf,

        /// Default calculation method
        #[arg(long, default_value = "isna")]
        method: CalcMethod,

        /// TrueType font for server-rendered overlays
        #[arg(long, value_name = "TTF")]
        font: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PtimeError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Times { location } => {
            let date = location.date()?;
            let loc = location.location()?;
            log::debug!("times for {} on {} ({})", loc, date, location.method);
            print!("{}", times::gen_times(date, &loc, location.method));
            Ok(())
        }

        Commands::Render {
            assets,
            out,
            variant,
            font,
            width,
            height,
            location,
        } => {
            let mut canvas = RasterCanvas::new(width, height);
            if let Some(path) = &font {
                canvas = canvas.with_font(raster::load_font(path)?);
            }

            let located = if location.has_location() {
                let date = location.date()?;
                let loc = location.location()?;
                Some((times::gen_times(date, &loc, location.method), loc.coordinates()))
            } else {
                None
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let page = runtime.block_on(overlay::render_page(
                canvas,
                Arc::new(FileImageLoader::new(&assets)),
                variant,
                located.as_ref().map(|(times, position)| (times, *position)),
            ));
            log::info!("{:?}", page.report);

            let canvas = page
                .canvas
                .ok_or_else(|| PtimeError::Image("Canvas missing".to_string()))?;
            std::fs::write(&out, canvas.encode_png()?)?;
            println!("Saved to {}", out.display());

            for (id, value) in &page.inputs {
                println!("{}\t{}", id, value);
            }
            Ok(())
        }

        Commands::Serve {
            listen,
            assets,
            zcta,
            method,
            font,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                assets_dir: assets,
                zcta_path: zcta,
                method,
                font_path: font,
                ..ServerConfig::default()
            };

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }
    }
}
