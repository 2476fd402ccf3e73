use std::{io, net::AddrParseError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid listen address {address}: {source}")]
    InvalidAddress {
        address: String,
        source: AddrParseError,
    },

    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),

    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
}
