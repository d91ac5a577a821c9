//! # Overlay Flow Tests
//!
//! Drive [`PositionAndOverlayRenderer::initialize`] against recording hosts
//! and check what the page would end up showing.

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, TimeZone};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ptime::{CalcMethod, PtimeError, times};
use ptime::location::{Coordinates, Location};
use ptime::overlay::{
    self, Canvas, Document, Geolocation, Host, ImageLoader, ImageOutcome, LocationOutcome,
    OverlayTimes, PageVariant, PositionAndOverlayRenderer, RasterCanvas, TextStyle,
    host::{CANVAS_ID, DATE_INPUT, LATITUDE_INPUT, LONGITUDE_INPUT, ZONE_INPUT},
    providers::{DeniedPosition, FixedPosition, StaticImage},
};

// ============================================================================
// TEST HOSTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Image { width: u32, x: i64, y: i64 },
    Text { text: String, x: i64, y: i64 },
}

/// Shared event log across the canvas, loader and geolocation.
type Events = Arc<Mutex<Vec<String>>>;

/// Canvas that remembers every call.
struct RecordingCanvas {
    ops: Vec<Op>,
    loaded: Arc<AtomicBool>,
    drew_before_load: bool,
    events: Events,
}

impl RecordingCanvas {
    fn new(loaded: Arc<AtomicBool>, events: Events) -> Self {
        Self {
            ops: Vec::new(),
            loaded,
            drew_before_load: false,
            events,
        }
    }

    fn texts(&self) -> Vec<(String, i64, i64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, x, y } => Some((text.clone(), *x, *y)),
                Op::Image { .. } => None,
            })
            .collect()
    }

    fn image_draws(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::Image { .. })).count()
    }
}

impl Canvas for RecordingCanvas {
    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        if !self.loaded.load(Ordering::SeqCst) {
            self.drew_before_load = true;
        }
        self.events.lock().unwrap().push("draw".to_string());
        self.ops.push(Op::Image {
            width: image.width(),
            x,
            y,
        });
    }

    fn fill_text(&mut self, text: &str, x: i64, y: i64, style: &TextStyle) {
        if !self.loaded.load(Ordering::SeqCst) {
            self.drew_before_load = true;
        }
        assert_eq!(style, &TextStyle::OVERLAY);
        self.ops.push(Op::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}

/// Loader that completes after a delay and flags completion.
struct DelayedLoader {
    delay: Duration,
    loaded: Arc<AtomicBool>,
    requested: Mutex<Vec<String>>,
    events: Events,
}

#[async_trait]
impl ImageLoader for DelayedLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, PtimeError> {
        self.requested.lock().unwrap().push(src.to_string());
        tokio::time::sleep(self.delay).await;
        self.loaded.store(true, Ordering::SeqCst);
        self.events.lock().unwrap().push("loaded".to_string());
        Ok(RgbaImage::from_pixel(1000, 600, Rgba([0, 0, 64, 255])))
    }
}

struct FailingLoader;

#[async_trait]
impl ImageLoader for FailingLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, PtimeError> {
        Err(PtimeError::Image(format!("{} not found", src)))
    }
}

/// Geolocation answering after a delay.
struct SlowPosition {
    delay: Duration,
    coords: Coordinates,
    events: Events,
}

#[async_trait]
impl Geolocation for SlowPosition {
    async fn current_position(&self) -> Option<Coordinates> {
        tokio::time::sleep(self.delay).await;
        self.events.lock().unwrap().push("position".to_string());
        Some(self.coords)
    }
}

struct Fixture {
    host: Host<RecordingCanvas>,
    loader: Arc<DelayedLoader>,
    events: Events,
}

fn fixture(delay_ms: u64) -> Fixture {
    let loaded = Arc::new(AtomicBool::new(false));
    let events: Events = Arc::default();
    let loader = Arc::new(DelayedLoader {
        delay: Duration::from_millis(delay_ms),
        loaded: loaded.clone(),
        requested: Mutex::new(Vec::new()),
        events: events.clone(),
    });
    let host = Host::new(
        Document::page(RecordingCanvas::new(loaded, events.clone())),
        loader.clone(),
    );
    Fixture {
        host,
        loader,
        events,
    }
}

fn fixed_times() -> OverlayTimes {
    OverlayTimes {
        fajr: "05:12".into(),
        dhuhr: "12:30".into(),
        asr: "15:45".into(),
        maghrib: "18:20".into(),
        isha: "19:50".into(),
        update_flag: true,
    }
}

fn canvas(host: &Host<RecordingCanvas>) -> &RecordingCanvas {
    host.document.canvas(CANVAS_ID).unwrap()
}

// ============================================================================
// LOCATION FLOW
// ============================================================================

#[tokio::test]
async fn test_coordinates_truncated_to_nine_characters() {
    let mut f = fixture(1);
    f.host = f.host.with_geolocation(Arc::new(FixedPosition(Coordinates::new(
        40.44062479999999,
        -79.99588640000002,
    ))));

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Basic)
        .initialize(&mut f.host)
        .await;

    assert!(matches!(report.location, LocationOutcome::Resolved(_)));
    let inputs = &f.host.document.inputs;
    assert_eq!(inputs.value(LATITUDE_INPUT), Some("40.440624"));
    assert_eq!(inputs.value(LONGITUDE_INPUT), Some("-79.99588"));
}

#[tokio::test]
async fn test_short_coordinates_kept_whole() {
    let mut f = fixture(1);
    f.host = f
        .host
        .with_geolocation(Arc::new(FixedPosition(Coordinates::new(40.0, -80.5))));

    PositionAndOverlayRenderer::for_variant(PageVariant::Basic)
        .initialize(&mut f.host)
        .await;

    let inputs = &f.host.document.inputs;
    assert_eq!(inputs.value(LATITUDE_INPUT), Some("40"));
    assert_eq!(inputs.value(LONGITUDE_INPUT), Some("-80.5"));
}

#[tokio::test]
async fn test_unsupported_geolocation_leaves_fields_unchanged() {
    let mut f = fixture(1);
    f.host.document.inputs.set_value(LATITUDE_INPUT, "12.5");

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Updated)
        .initialize(&mut f.host)
        .await;

    assert_eq!(report.location, LocationOutcome::Unsupported);
    assert_eq!(f.host.document.inputs.value(LATITUDE_INPUT), Some("12.5"));
    assert_eq!(f.host.document.inputs.value(LONGITUDE_INPUT), Some(""));
    // The image flow still completes.
    assert_eq!(report.image, ImageOutcome::Drawn { overlay: true });
}

#[tokio::test]
async fn test_denied_geolocation_is_dropped() {
    let mut f = fixture(1);
    f.host = f.host.with_geolocation(Arc::new(DeniedPosition));

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Basic)
        .initialize(&mut f.host)
        .await;

    assert_eq!(report.location, LocationOutcome::Dropped);
    assert_eq!(f.host.document.inputs.value(LATITUDE_INPUT), Some(""));
}

// ============================================================================
// IMAGE FLOW
// ============================================================================

#[tokio::test]
async fn test_overlay_drawn_only_after_load() {
    let mut f = fixture(30);
    let renderer =
        PositionAndOverlayRenderer::for_variant(PageVariant::Updated).with_times(fixed_times());

    let report = renderer.initialize(&mut f.host).await;

    assert_eq!(report.image, ImageOutcome::Drawn { overlay: true });
    let canvas = canvas(&f.host);
    assert!(!canvas.drew_before_load);
    assert_eq!(
        canvas.ops[0],
        Op::Image {
            width: 1000,
            x: 0,
            y: 0
        }
    );
    assert_eq!(
        canvas.texts(),
        vec![
            ("05:12".to_string(), 50, 535),
            ("12:30".to_string(), 60, 210),
            ("15:45".to_string(), 550, 70),
            ("18:20".to_string(), 880, 210),
            ("19:50".to_string(), 900, 535),
        ]
    );
    assert_eq!(
        f.loader.requested.lock().unwrap().as_slice(),
        ["/www/img/earthViz.png"]
    );
}

#[tokio::test]
async fn test_flows_run_independently() {
    let mut f = fixture(40);
    f.host = f.host.with_geolocation(Arc::new(SlowPosition {
        delay: Duration::from_millis(1),
        coords: Coordinates::new(21.4225, 39.8262),
        events: f.events.clone(),
    }));

    PositionAndOverlayRenderer::for_variant(PageVariant::Updated)
        .initialize(&mut f.host)
        .await;

    // The position lands while the image is still loading.
    assert_eq!(
        f.events.lock().unwrap().as_slice(),
        ["position", "loaded", "draw"]
    );
    assert_eq!(f.host.document.inputs.value(LATITUDE_INPUT), Some("21.4225"));
}

#[tokio::test]
async fn test_slow_position_does_not_delay_draw() {
    let mut f = fixture(1);
    f.host = f.host.with_geolocation(Arc::new(SlowPosition {
        delay: Duration::from_millis(40),
        coords: Coordinates::new(1.0, 2.0),
        events: f.events.clone(),
    }));

    PositionAndOverlayRenderer::for_variant(PageVariant::Basic)
        .initialize(&mut f.host)
        .await;

    assert_eq!(
        f.events.lock().unwrap().as_slice(),
        ["loaded", "draw", "position"]
    );
}

#[tokio::test]
async fn test_placeholder_tokens_drawn_verbatim() {
    let mut f = fixture(1);

    PositionAndOverlayRenderer::for_variant(PageVariant::Updated)
        .initialize(&mut f.host)
        .await;

    let texts: Vec<String> = canvas(&f.host).texts().into_iter().map(|t| t.0).collect();
    assert_eq!(
        texts,
        vec![
            "{{index timeMap fajr}}",
            "{{index timeMap dhuhr}}",
            "{{.asr}}",
            "{{.maghrib}}",
            "{{.isha}}",
        ]
    );
}

#[tokio::test]
async fn test_basic_variant_draws_background_only() {
    let mut f = fixture(1);

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Basic)
        .initialize(&mut f.host)
        .await;

    assert_eq!(report.image, ImageOutcome::Drawn { overlay: false });
    let canvas = canvas(&f.host);
    assert_eq!(canvas.image_draws(), 1);
    assert!(canvas.texts().is_empty());
    assert_eq!(
        f.loader.requested.lock().unwrap().as_slice(),
        ["../img/earthViz.png"]
    );
    // Basic pages leave date and zone alone.
    assert_eq!(f.host.document.inputs.value(DATE_INPUT), Some(""));
}

#[tokio::test]
async fn test_repeated_initialize_draws_once_per_load() {
    let mut f = fixture(1);
    let renderer =
        PositionAndOverlayRenderer::for_variant(PageVariant::Updated).with_times(fixed_times());

    renderer.initialize(&mut f.host).await;
    renderer.initialize(&mut f.host).await;

    let canvas = canvas(&f.host);
    assert_eq!(canvas.image_draws(), 2);
    assert_eq!(canvas.texts().len(), 10);
    assert_eq!(f.loader.requested.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_canvas_skips_image_flow() {
    let mut host: Host<RecordingCanvas> = Host::new(
        Document::new().with_inputs(&[LATITUDE_INPUT, LONGITUDE_INPUT]),
        Arc::new(FailingLoader),
    )
    .with_geolocation(Arc::new(FixedPosition(Coordinates::new(10.0, 20.0))));

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Basic)
        .initialize(&mut host)
        .await;

    assert_eq!(report.image, ImageOutcome::NoCanvas);
    assert_eq!(host.document.inputs.value(LATITUDE_INPUT), Some("10"));
}

#[tokio::test]
async fn test_failed_load_draws_nothing() {
    let loaded = Arc::new(AtomicBool::new(false));
    let mut host = Host::new(
        Document::page(RecordingCanvas::new(loaded, Arc::default())),
        Arc::new(FailingLoader),
    );

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Updated)
        .initialize(&mut host)
        .await;

    assert_eq!(report.image, ImageOutcome::LoadFailed);
    assert!(canvas(&host).ops.is_empty());
}

// ============================================================================
// DATE AND ZONE
// ============================================================================

#[tokio::test]
async fn test_date_and_zone_autofill() {
    let mut f = fixture(1);
    let renderer = PositionAndOverlayRenderer::for_variant(PageVariant::Updated).with_clock(|| {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2016, 1, 22, 9, 30, 0)
            .unwrap()
    });

    renderer.initialize(&mut f.host).await;

    assert_eq!(f.host.document.inputs.value(DATE_INPUT), Some("2016/1/22"));
    assert_eq!(f.host.document.inputs.value(ZONE_INPUT), Some("-5"));
}

#[tokio::test]
async fn test_half_hour_zone() {
    let mut f = fixture(1);
    let renderer = PositionAndOverlayRenderer::for_variant(PageVariant::Updated).with_clock(|| {
        FixedOffset::east_opt(5 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2023, 11, 5, 12, 0, 0)
            .unwrap()
    });

    renderer.initialize(&mut f.host).await;

    assert_eq!(f.host.document.inputs.value(DATE_INPUT), Some("2023/11/5"));
    assert_eq!(f.host.document.inputs.value(ZONE_INPUT), Some("5.5"));
}

// ============================================================================
// RASTER BACKEND
// ============================================================================

#[tokio::test]
async fn test_raster_page_load_paints_background_and_text() {
    let background = RgbaImage::from_pixel(1000, 600, Rgba([0, 0, 0, 255]));
    let mut host = Host::new(
        Document::page(RasterCanvas::new(1000, 600)),
        Arc::new(StaticImage(background)),
    );

    let report = PositionAndOverlayRenderer::for_variant(PageVariant::Updated)
        .with_times(fixed_times())
        .initialize(&mut host)
        .await;
    assert_eq!(report.image, ImageOutcome::Drawn { overlay: true });

    let image = host.document.take_canvas(CANVAS_ID).unwrap().into_image();
    assert_eq!(image.get_pixel(999, 0), &Rgba([0, 0, 0, 255]));

    // Some white text lands just above the fajr baseline.
    let lit = (50..110)
        .flat_map(|x| (515..536).map(move |y| (x, y)))
        .filter(|&(x, y)| image.get_pixel(x, y).0[0] > 200)
        .count();
    assert!(lit > 0);
}

// ============================================================================
// ONE-SHOT RENDER
// ============================================================================

fn reference_day() -> (times::PrayerTimes, Coordinates) {
    let loc = Location::new(40.0, -80.0, -5.0);
    let date = NaiveDate::from_ymd_opt(2016, 1, 22).unwrap();
    (times::gen_times(date, &loc, CalcMethod::Isna), loc.coordinates())
}

fn recording_canvas() -> RecordingCanvas {
    RecordingCanvas::new(Arc::new(AtomicBool::new(true)), Arc::default())
}

fn black_background() -> Arc<StaticImage> {
    Arc::new(StaticImage(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]))))
}

#[tokio::test]
async fn test_render_page_updated_with_location() {
    let (day, position) = reference_day();

    let page = overlay::render_page(
        recording_canvas(),
        black_background(),
        PageVariant::Updated,
        Some((&day, position)),
    )
    .await;

    assert_eq!(page.report.image, ImageOutcome::Drawn { overlay: true });
    assert_eq!(page.report.location, LocationOutcome::Resolved(position));
    let texts: Vec<String> = page.canvas.unwrap().texts().into_iter().map(|t| t.0).collect();
    assert_eq!(texts, vec!["06:18", "12:31", "15:06", "17:27", "18:45"]);
    assert_eq!(page.inputs.get(LATITUDE_INPUT).map(String::as_str), Some("40"));
    assert_eq!(page.inputs.get(LONGITUDE_INPUT).map(String::as_str), Some("-80"));
    assert!(page.inputs.contains_key(DATE_INPUT));
    assert!(page.inputs.contains_key(ZONE_INPUT));
}

#[tokio::test]
async fn test_render_page_basic_ignores_times() {
    let (day, position) = reference_day();

    let page = overlay::render_page(
        recording_canvas(),
        black_background(),
        PageVariant::Basic,
        Some((&day, position)),
    )
    .await;

    assert_eq!(page.report.image, ImageOutcome::Drawn { overlay: false });
    assert!(page.canvas.unwrap().texts().is_empty());
    // Basic pages fill only the coordinates.
    let ids: Vec<&str> = page.inputs.keys().map(String::as_str).collect();
    assert_eq!(ids, vec![LATITUDE_INPUT, LONGITUDE_INPUT]);
}

#[tokio::test]
async fn test_render_page_without_location() {
    let page = overlay::render_page(
        recording_canvas(),
        black_background(),
        PageVariant::Updated,
        None,
    )
    .await;

    assert_eq!(page.report.location, LocationOutcome::Unsupported);
    let texts: Vec<String> = page.canvas.unwrap().texts().into_iter().map(|t| t.0).collect();
    assert_eq!(texts[0], "{{index timeMap fajr}}");
    assert!(!page.inputs.contains_key(LATITUDE_INPUT));
}
