//! Readers for the Linux `/proc` filesystem.
//!
//! This module provides the parsers for the handful of `/proc` files the
//! host source needs, and the error type shared by raw OS reads.

pub mod parser;

pub use parser::ParseError;

/// Error type for raw OS reads.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading an OS file.
    Io(std::io::Error),
    /// Parse error in an OS file.
    Parse(String),
    /// The requested data is not available on this host.
    Unsupported(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
            CollectError::Unsupported(msg) => write!(f, "unsupported: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}
