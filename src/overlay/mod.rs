//! # Earth Overlay Page
//!
//! The page-load behaviour of the earth page: draw the background image
//! onto the `earthViz` canvas, overlay the five prayer times, and fill the
//! location inputs from the platform's geolocation.
//!
//! Two flows start from [`PositionAndOverlayRenderer::initialize`] and run
//! independently of each other:
//!
//! - **image**: load the background, then draw it and (in the updated
//!   variant) the times. The draw is the continuation of the load, so it can
//!   never run before the image is available.
//! - **location**: ask the [`Geolocation`] capability for a position and
//!   write the truncated coordinates into the inputs.
//!
//! Neither flow retries, times out or reports failure to the page. What
//! happened is returned as an [`InitReport`].

pub mod format;
pub mod host;
pub mod providers;
pub mod raster;

pub use host::{Canvas, Document, Geolocation, Host, ImageLoader, Inputs, TextStyle};
pub use raster::RasterCanvas;

use chrono::{DateTime, FixedOffset, Local};
use image::RgbaImage;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::location::Coordinates;
use crate::times::{Prayer, PrayerTimes};

use host::{CANVAS_ID, DATE_INPUT, LATITUDE_INPUT, LONGITUDE_INPUT, ZONE_INPUT};

/// Message logged when the platform has no geolocation capability.
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported by this browser.";

/// Template tokens the server-side pass replaces in the updated script.
pub const FAJR_TOKEN: &str = "{{index timeMap fajr}}";
pub const DHUHR_TOKEN: &str = "{{index timeMap dhuhr}}";
pub const ASR_TOKEN: &str = "{{.asr}}";
pub const MAGHRIB_TOKEN: &str = "{{.maghrib}}";
pub const ISHA_TOKEN: &str = "{{.isha}}";

/// The two shipped page scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PageVariant {
    /// Background and location only.
    Basic,
    /// Background with times overlaid, plus date and zone autofill.
    #[default]
    Updated,
}

impl PageVariant {
    pub fn background_src(self) -> &'static str {
        match self {
            PageVariant::Basic => "../img/earthViz.png",
            PageVariant::Updated => "/www/img/earthViz.png",
        }
    }
}

/// Canvas baselines for each overlaid time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub fajr: (i64, i64),
    pub dhuhr: (i64, i64),
    pub asr: (i64, i64),
    pub maghrib: (i64, i64),
    pub isha: (i64, i64),
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            fajr: (50, 535),
            dhuhr: (60, 210),
            asr: (550, 70),
            maghrib: (880, 210),
            isha: (900, 535),
        }
    }
}

/// Display strings drawn over the background.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayTimes {
    pub fajr: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
    pub update_flag: bool,
}

impl OverlayTimes {
    /// The unsubstituted template tokens.
    pub fn placeholders() -> Self {
        Self {
            fajr: FAJR_TOKEN.to_string(),
            dhuhr: DHUHR_TOKEN.to_string(),
            asr: ASR_TOKEN.to_string(),
            maghrib: MAGHRIB_TOKEN.to_string(),
            isha: ISHA_TOKEN.to_string(),
            update_flag: true,
        }
    }

    pub fn from_prayer_times(times: &PrayerTimes) -> Self {
        Self {
            fajr: times.display(Prayer::Fajr),
            dhuhr: times.display(Prayer::Dhuhr),
            asr: times.display(Prayer::Asr),
            maghrib: times.display(Prayer::Maghrib),
            isha: times.display(Prayer::Isha),
            update_flag: true,
        }
    }

    /// (token, value) pairs for the template pass.
    pub fn substitutions(&self) -> [(&'static str, &str); 5] {
        [
            (FAJR_TOKEN, self.fajr.as_str()),
            (DHUHR_TOKEN, self.dhuhr.as_str()),
            (ASR_TOKEN, self.asr.as_str()),
            (MAGHRIB_TOKEN, self.maghrib.as_str()),
            (ISHA_TOKEN, self.isha.as_str()),
        ]
    }

    fn placed<'a>(&'a self, layout: &OverlayLayout) -> [(&'a str, (i64, i64)); 5] {
        [
            (self.fajr.as_str(), layout.fajr),
            (self.dhuhr.as_str(), layout.dhuhr),
            (self.asr.as_str(), layout.asr),
            (self.maghrib.as_str(), layout.maghrib),
            (self.isha.as_str(), layout.isha),
        ]
    }
}

/// Renderer settings. [`RendererConfig::for_variant`] gives each shipped
/// script's behaviour; the fields can be mixed freely.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub background_src: String,
    /// Draw the times after the background. Ignored when no times are set.
    pub draw_times: bool,
    /// Write today's date and UTC offset before requesting location.
    pub autofill_date_zone: bool,
    pub layout: OverlayLayout,
    pub text_style: TextStyle,
}

impl RendererConfig {
    pub fn for_variant(variant: PageVariant) -> Self {
        let updated = variant == PageVariant::Updated;
        Self {
            background_src: variant.background_src().to_string(),
            draw_times: updated,
            autofill_date_zone: updated,
            layout: OverlayLayout::default(),
            text_style: TextStyle::OVERLAY,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::for_variant(PageVariant::default())
    }
}

/// What became of the image flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Background drawn; `overlay` says whether the times were drawn too.
    Drawn { overlay: bool },
    /// The load failed. Nothing was drawn.
    LoadFailed,
    /// No `earthViz` canvas in the document.
    NoCanvas,
}

/// What became of the location flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationOutcome {
    Resolved(Coordinates),
    /// Denied or failed. The inputs were left alone.
    Dropped,
    /// The platform has no location capability.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    pub image: ImageOutcome,
    pub location: LocationOutcome,
}

type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Page-load orchestration for the earth page.
pub struct PositionAndOverlayRenderer {
    config: RendererConfig,
    times: Option<OverlayTimes>,
    clock: Clock,
}

impl PositionAndOverlayRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            times: None,
            clock: Arc::new(|| Local::now().fixed_offset()),
        }
    }

    pub fn for_variant(variant: PageVariant) -> Self {
        let renderer = Self::new(RendererConfig::for_variant(variant));
        match variant {
            PageVariant::Basic => renderer,
            PageVariant::Updated => renderer.with_times(OverlayTimes::placeholders()),
        }
    }

    pub fn with_times(mut self, times: OverlayTimes) -> Self {
        self.times = Some(times);
        self
    }

    /// Replace the wall clock used for the date and zone inputs.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<FixedOffset> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Run one page load against `host`.
    ///
    /// Each call starts its own load and draws its own background once.
    pub async fn initialize<C: Canvas>(&self, host: &mut Host<C>) -> InitReport {
        let images = host.images.clone();
        let geolocation = host.geolocation.clone();
        let (canvas, inputs) = host.document.split_mut(CANVAS_ID);

        if self.config.autofill_date_zone {
            self.fill_date_zone(inputs);
        }

        let (image, location) = tokio::join!(
            self.load_background(canvas, images.as_ref()),
            Self::request_location(geolocation.as_deref(), inputs),
        );

        let report = InitReport { image, location };
        log::debug!("page load finished: {:?}", report);
        report
    }

    fn fill_date_zone(&self, inputs: &mut Inputs) {
        let now = (self.clock)();
        let zone = format::zone_field(&now);
        log::debug!("zone offset {}", zone);
        inputs.set_value(DATE_INPUT, format::date_field(&now));
        inputs.set_value(ZONE_INPUT, zone);
    }

    async fn load_background<C: Canvas>(
        &self,
        canvas: Option<&mut C>,
        images: &dyn ImageLoader,
    ) -> ImageOutcome {
        let Some(ctx) = canvas else {
            log::warn!("no canvas element #{}, skipping background", CANVAS_ID);
            return ImageOutcome::NoCanvas;
        };

        match images.load(&self.config.background_src).await {
            Ok(img) => ImageOutcome::Drawn {
                overlay: self.on_image_loaded(ctx, &img),
            },
            Err(e) => {
                log::debug!("background {} not drawn: {}", self.config.background_src, e);
                ImageOutcome::LoadFailed
            }
        }
    }

    /// Draw the loaded background and, when configured, the times.
    /// Returns whether the times were drawn.
    pub fn on_image_loaded<C: Canvas + ?Sized>(&self, ctx: &mut C, img: &RgbaImage) -> bool {
        ctx.draw_image(img, 0, 0);

        let Some(times) = self.times.as_ref().filter(|_| self.config.draw_times) else {
            return false;
        };
        for (text, (x, y)) in times.placed(&self.config.layout) {
            ctx.fill_text(text, x, y, &self.config.text_style);
        }
        true
    }

    /// Ask for the current position and fill the inputs if one arrives.
    pub async fn request_location(
        geolocation: Option<&dyn Geolocation>,
        inputs: &mut Inputs,
    ) -> LocationOutcome {
        let Some(geolocation) = geolocation else {
            log::warn!("{}", GEOLOCATION_UNSUPPORTED);
            return LocationOutcome::Unsupported;
        };

        match geolocation.current_position().await {
            Some(coords) => {
                Self::on_position_resolved(inputs, coords);
                LocationOutcome::Resolved(coords)
            }
            None => LocationOutcome::Dropped,
        }
    }

    /// Write each coordinate, cut to nine characters, into its input.
    pub fn on_position_resolved(inputs: &mut Inputs, coords: Coordinates) {
        log::debug!("position {:?}", coords);
        inputs.set_value(LATITUDE_INPUT, format::coordinate_field(coords.latitude));
        inputs.set_value(LONGITUDE_INPUT, format::coordinate_field(coords.longitude));
    }
}

/// Result of [`render_page`].
pub struct RenderedPage<C> {
    /// The `earthViz` canvas after the load.
    pub canvas: Option<C>,
    /// Non-empty input values.
    pub inputs: BTreeMap<String, String>,
    pub report: InitReport,
}

/// One page load outside a browser.
///
/// With a location, the viewer reports that position and the updated
/// variant draws the computed times. Without one there is no geolocation
/// and the updated variant draws its template tokens.
pub async fn render_page<C: Canvas>(
    canvas: C,
    images: Arc<dyn ImageLoader>,
    variant: PageVariant,
    located: Option<(&PrayerTimes, Coordinates)>,
) -> RenderedPage<C> {
    let mut renderer = PositionAndOverlayRenderer::for_variant(variant);
    let mut host = Host::new(Document::page(canvas), images);

    if let Some((times, position)) = located {
        if variant == PageVariant::Updated {
            renderer = renderer.with_times(OverlayTimes::from_prayer_times(times));
        }
        host = host.with_geolocation(Arc::new(providers::FixedPosition(position)));
    }

    let report = renderer.initialize(&mut host).await;
    RenderedPage {
        canvas: host.document.take_canvas(CANVAS_ID),
        inputs: filled_inputs(&host.document.inputs),
        report,
    }
}

/// Input values after a page load, for display.
pub fn filled_inputs(inputs: &Inputs) -> BTreeMap<String, String> {
    inputs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
