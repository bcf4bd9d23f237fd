/*!
 * Error types for the bilisubdl application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the Bilibili API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Non-200 HTTP status
    #[error("http error {status_code}")]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
    },

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself inside the response envelope
    #[error("api response {message} (code {code})")]
    Api {
        /// Envelope code, non-zero on failure
        code: i64,
        /// Message from the API
        message: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            Self::HttpStatus { status_code: status.as_u16() }
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while converting subtitle payloads
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Cue-list JSON could not be decoded
    #[error("Failed to decode subtitle payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the remote API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Error from subtitle conversion
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
