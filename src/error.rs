//! # Error Types
//!
//! This module defines error types used throughout the ptime library.

use thiserror::Error;

/// Main error type for ptime operations
#[derive(Debug, Error)]
pub enum PtimeError {
    /// Date string that does not match the expected format
    #[error("Invalid date {0}")]
    InvalidDate(String),

    /// Location flags or form fields that do not describe a place
    #[error("{0}")]
    InvalidLocation(String),

    /// Time zone outside the accepted range, or not a number
    #[error("Invalid time zone, {0}")]
    InvalidZone(String),

    /// Unknown calculation method name
    #[error("Unknown calculation method '{0}'")]
    UnknownMethod(String),

    /// ZIP code missing from the centroid file
    #[error("Zip code {0} is not available")]
    ZipNotFound(String),

    /// Image loading, decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// Server bind or serve error
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PtimeError {
    /// True for errors caused by the caller's input rather than the host.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PtimeError::InvalidDate(_)
                | PtimeError::InvalidLocation(_)
                | PtimeError::InvalidZone(_)
                | PtimeError::UnknownMethod(_)
        )
    }
}
