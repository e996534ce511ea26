//! Request adapter for host runtimes that expose fixed HTTP verb
//! primitives instead of sockets.
//!
//! # Overview
//! Some execution environments give embedded code no network stack, only
//! four opaque platform functions, one per HTTP verb, each taking a URL
//! and a grab-bag of options and returning a response body or throwing.
//! This crate adapts that surface to the calling convention of a
//! conventional HTTP client: describe a request once (method, URL,
//! headers, body, query, timeouts), get back a uniform
//! `(status, body, url)` outcome whether the host call succeeded or
//! failed.
//!
//! # Design
//! - The host boundary is a trait (`HostVerbs`); the core performs no I/O
//!   itself and stays fully deterministic under test.
//! - Form bodies and query strings are typed (`FormParams`): a field is
//!   an integer, text, or bytes scalar, or a flat sequence of those,
//!   validated at construction and encoded with the repeated-key
//!   convention.
//! - Host I/O failures are data, not errors: the status code is recovered
//!   from the host's error text (466 when unrecoverable) and the message
//!   is wrapped in a JSON error body.
//! - Proxy configuration is instance state on `HostClient`, overridable
//!   per call.

pub mod client;
pub mod error;
pub mod form;
pub mod host;
pub mod request;
pub mod status;

pub use client::HostClient;
pub use error::RequestError;
pub use form::{FormParams, FormValue, Scalar, FORM_URLENCODED};
pub use host::{HostIoError, HostVerbs, ProxyConfig, VerbCall};
pub use request::{
    Body, Method, Outcome, Request, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS,
};
pub use status::{status_from_message, FALLBACK_STATUS};
