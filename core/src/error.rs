//! Error types for the host-verb adapter.
//!
//! # Design
//! Only usage errors surface as `Err`: an unrecognized verb, or a form
//! value the host interface cannot carry. Host I/O failures are not errors
//! at this API. They are normalized into an `Outcome` with an elevated
//! status code, because network trouble is a normal operational result for
//! the adapted interface.

use std::fmt;

/// Errors raised before any host verb is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The method is not one of POST, PUT, GET, DELETE. The host provides
    /// no primitive for anything else.
    UnsupportedMethod(String),

    /// A form field holds a value that is not an integer, text, bytes, or
    /// a flat sequence of those. An empty `key` means the payload as a
    /// whole had the wrong shape.
    UnsupportedValue { key: String, detail: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::UnsupportedMethod(method) => {
                write!(
                    f,
                    "method '{method}' is not implemented; only POST, PUT, GET, and DELETE are available"
                )
            }
            RequestError::UnsupportedValue { key, detail } if key.is_empty() => {
                write!(f, "unsupported form payload: {detail}")
            }
            RequestError::UnsupportedValue { key, detail } => {
                write!(f, "unsupported value for field '{key}': {detail}")
            }
        }
    }
}

impl std::error::Error for RequestError {}
