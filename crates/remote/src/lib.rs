//! HTTP clients for the prompt extraction and image generation services.
//!
//! [`CompletionPromptExtractor`] asks an OpenAI-compatible completions
//! endpoint to propose prompts for an excerpt. [`ImagineClient`] posts a
//! prompt to an image endpoint and reads back a reference to the image.

#[macro_use]
extern crate tracing;

mod config;
mod extractor;
mod imagine;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};

use reqwest::StatusCode;
use storyboard_model::{ErrorKind, ServiceError};

pub use config::{
    AuthScheme, CompletionConfig, CompletionConfigBuilder, ImagineConfig,
    ImagineConfigBuilder,
};
pub use extractor::CompletionPromptExtractor;
pub use imagine::ImagineClient;

/// Error type for the clients in this crate.
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ServiceError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = match err.status() {
            Some(StatusCode::TOO_MANY_REQUESTS) => ErrorKind::RateLimitExceeded,
            Some(_) => ErrorKind::Rejected,
            None if err.is_decode() => ErrorKind::InvalidResponse,
            None => ErrorKind::Network,
        };
        Self::new(format!("{err}"), kind)
    }
}

/// Reads the `Content-Type` of a response, if it is a valid mime type.
fn content_type(resp: &reqwest::Response) -> Option<mime::Mime> {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
