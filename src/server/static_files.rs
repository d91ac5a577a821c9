//! Static file serving for the page.

use axum::{
    extract::{RawQuery, State},
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use include_dir::{Dir, include_dir};
use std::sync::Arc;

use super::state::AppState;

/// Embedded page files.
static WWW: Dir = include_dir!("$CARGO_MANIFEST_DIR/www");

const INDEX: &str = "html/main.html";
const UPDATED_SCRIPT_TAG: &str = "src=\"/www/js/updated.js\"";

/// Request path relative to `/www/`, without any query.
pub fn www_path(uri: &Uri) -> &str {
    uri.path().trim_start_matches('/').trim_start_matches("www/")
}

pub fn embedded_text(path: &str) -> Option<String> {
    WWW.get_file(path)
        .map(|f| String::from_utf8_lossy(f.contents()).into_owned())
}

/// Serve one embedded file with its guessed content type.
pub fn serve_embedded(path: &str) -> Response {
    match WWW.get_file(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();
            (
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                file.contents().to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Asset not found").into_response(),
    }
}

/// Serve the page. A query string is passed through to the updated script so
/// its tokens get filled in; otherwise a cache-busting parameter is added.
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    match embedded_text(INDEX) {
        Some(contents) => {
            let suffix = match query.filter(|q| !q.is_empty()) {
                Some(q) => q,
                None => format!("v={}", state.boot_time),
            };
            let tag = format!("src=\"/www/js/updated.js?{}\"", html_attr_escape(&suffix));
            Html(contents.replace(UPDATED_SCRIPT_TAG, &tag)).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Page not built").into_response(),
    }
}

/// GET /www/css/*, /www/html/* - Embedded assets.
pub async fn asset_handler(uri: Uri) -> Response {
    serve_embedded(www_path(&uri))
}

fn html_attr_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}
