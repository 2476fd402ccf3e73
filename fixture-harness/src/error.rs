use hyper::http;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed fixture {fixture}: {reason}")]
    MalformedFixture { fixture: String, reason: String },

    #[error("IoError: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid request URI: {0}")]
    InvalidUri(String),

    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),

    #[error("Http Error: {0}")]
    HttpError(#[from] http::Error),

    #[error("The service under test failed: {0}")]
    Transport(String),
}

impl Error {
    pub fn malformed<S1: Into<String>, S2: Into<String>>(fixture: S1, reason: S2) -> Self {
        Error::MalformedFixture {
            fixture: fixture.into(),
            reason: reason.into(),
        }
    }
}
