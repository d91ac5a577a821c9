//! Earth overlay handlers: server-side PNG rendering and the templated
//! page script.

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    location::Coordinates,
    overlay::{
        Document, Host, OverlayTimes, PageVariant, PositionAndOverlayRenderer, RasterCanvas,
        host::CANVAS_ID,
        providers::{FileImageLoader, FixedPosition},
    },
};

use super::super::{state::AppState, static_files};
use super::error_response;
use super::times::LocationForm;

/// Script whose tokens are substituted.
const TEMPLATED_SCRIPT: &str = "js/updated.js";

#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    #[serde(default)]
    pub variant: Option<String>,
}

fn parse_variant(raw: Option<&str>) -> Result<PageVariant, String> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(PageVariant::default()),
        Some(v) if v.eq_ignore_ascii_case("basic") => Ok(PageVariant::Basic),
        Some(v) if v.eq_ignore_ascii_case("updated") => Ok(PageVariant::Updated),
        Some(v) => Err(format!("Unknown variant '{}'", v)),
    }
}

/// Times for the overlay: computed when the query names a location,
/// otherwise the raw template tokens.
async fn overlay_times(
    form: &LocationForm,
    state: &Arc<AppState>,
) -> Result<OverlayTimes, Response> {
    if !form.has_location() {
        return Ok(OverlayTimes::placeholders());
    }
    form.clone()
        .prayer_times_blocking(state.clone())
        .await
        .map(|t| OverlayTimes::from_prayer_times(&t))
        .map_err(|e| error_response(&e))
}

/// GET /overlay.png - Run the page renderer server-side and return the canvas.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Query(form): Query<LocationForm>,
    Query(variant): Query<VariantQuery>,
) -> Response {
    let variant = match parse_variant(variant.variant.as_deref()) {
        Ok(v) => v,
        Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
    };
    let times = match overlay_times(&form, &state).await {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let mut canvas = RasterCanvas::new(state.config.canvas_width, state.config.canvas_height);
    if let Some(font) = &state.font {
        canvas = canvas.with_font(font.clone());
    }

    let mut host = Host::new(
        Document::page(canvas),
        Arc::new(FileImageLoader::new(&state.config.assets_dir)),
    );
    let lat = form.latitude.as_deref().and_then(|v| v.trim().parse::<f64>().ok());
    let long = form.longitude.as_deref().and_then(|v| v.trim().parse::<f64>().ok());
    if let (Some(lat), Some(long)) = (lat, long) {
        host = host.with_geolocation(Arc::new(FixedPosition(Coordinates::new(lat, long))));
    }

    let renderer = PositionAndOverlayRenderer::for_variant(variant).with_times(times);
    let report = renderer.initialize(&mut host).await;
    log::info!("overlay {:?}: {:?}", variant, report);

    let Some(canvas) = host.document.take_canvas(CANVAS_ID) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Canvas missing").into_response();
    };
    match canvas.encode_png() {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Replace each template token with its value.
pub fn substitute(script: &str, times: &OverlayTimes) -> String {
    times
        .substitutions()
        .into_iter()
        .fold(script.to_string(), |acc, (token, value)| acc.replace(token, value))
}

/// GET /www/js/*path - Page scripts. `updated.js` has its tokens filled in
/// when the query names a location and is served verbatim otherwise.
pub async fn script(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Query(form): Query<LocationForm>,
) -> Response {
    let path = static_files::www_path(&uri);
    if path != TEMPLATED_SCRIPT || !form.has_location() {
        return static_files::serve_embedded(path);
    }

    let Some(source) = static_files::embedded_text(path) else {
        return (StatusCode::NOT_FOUND, "Asset not found").into_response();
    };
    match overlay_times(&form, &state).await {
        Ok(times) => (
            [(header::CONTENT_TYPE, "text/javascript"), (header::CACHE_CONTROL, "no-store")],
            substitute(&source, &times),
        )
            .into_response(),
        Err(resp) => resp,
    }
}
