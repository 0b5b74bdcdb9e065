//! Errors returned by the [`Parser`](crate::Parser) front door.
//!
//! Malformed playlist text never produces an error: the scanners recover
//! locally and report problems through the `warnings` list of the record they
//! return. The variants here only cover checks made before scanning starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input is {size} bytes, limit is {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("unknown playlist format {0:?}, expected \"iptv\" or \"hls\"")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
