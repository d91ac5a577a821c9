//! # HTTP Server for Prayer Times
//!
//! Serves the prayer-time form page, computes times for posted locations, and
//! renders the Earth overlay server-side.
//!
//! ## Usage
//!
//! ```bash
//! ptime serve --listen 0.0.0.0:4040 --assets ./www
//! ```
//!
//! Then open http://localhost:4040 in a browser.

mod handlers;
mod state;
mod static_files;

pub use handlers::overlay::substitute;
pub use handlers::times::LocationForm;
pub use state::{AppState, ServerConfig};

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::error::PtimeError;

/// Build the application router.
///
/// Background images come from `assets_dir/img` on disk; page scripts,
/// styles and markup are embedded in the binary.
pub fn router(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(state.config.assets_dir.join("img"));

    Router::new()
        // Page
        .route(
            "/",
            get(static_files::index_handler).post(handlers::times::submit),
        )
        // API
        .route("/api/methods", get(handlers::times::methods))
        .route("/overlay.png", get(handlers::overlay::render))
        // Assets
        .route("/www/js/*path", get(handlers::overlay::script))
        .route("/www/css/*path", get(static_files::asset_handler))
        .route("/www/html/*path", get(static_files::asset_handler))
        .nest_service("/www/img", images)
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use ptime::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), ptime::error::PtimeError> {
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:4040".to_string(),
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), PtimeError> {
    let app_state = Arc::new(AppState::new(config.clone())?);
    let app = router(app_state);

    println!("ptime HTTP server starting...");
    println!("Listening on: {}", config.listen_addr);
    println!("Assets: {}", config.assets_dir.display());
    println!("ZCTA file: {}", config.zcta_path.display());
    println!("Default method: {}", config.method);
    println!();
    println!("Open http://{}/ in your browser", config.listen_addr);
    println!();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            PtimeError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PtimeError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
