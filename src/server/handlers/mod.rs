//! HTTP handlers for the server.

pub mod overlay;
pub mod times;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::PtimeError;

/// Plain-text error reply with a status matching the error's cause.
pub fn error_response(err: &PtimeError) -> Response {
    let status = match err {
        PtimeError::ZipNotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_user_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log::warn!("{} {}", status.as_u16(), err);
    (status, err.to_string()).into_response()
}
