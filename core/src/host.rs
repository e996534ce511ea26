//! The host boundary: the four fixed platform verb functions as a trait.
//!
//! # Design
//! The execution environment provides no sockets, only one opaque function
//! per verb. `HostVerbs` captures those four signatures as the platform
//! defines them: every verb receives the common call parameters
//! (`VerbCall`), but only POST and PUT accept a content type and a
//! payload. On success a verb yields the response body and nothing else;
//! there is no status code in the host's success contract. On failure it
//! yields `HostIoError`, an opaque message in whatever format the host's
//! URL loader produces.

use std::fmt;

/// Proxy host/port pair passed through to the host verbs.
///
/// Naive proxying only: no credentials, no scheme. A missing port means
/// `ProxyConfig::DEFAULT_PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub const DEFAULT_PORT: u16 = 8080;

    pub fn new(host: impl Into<String>) -> Self {
        ProxyConfig {
            host: host.into(),
            port: Self::DEFAULT_PORT,
        }
    }

    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        ProxyConfig {
            host: host.into(),
            port,
        }
    }
}

/// Borrowed view of the parameters every host verb receives.
///
/// Timeouts are pass-through values in milliseconds; the host owns their
/// enforcement. Credentials and the certificate-validation flag are
/// likewise handed over untouched.
#[derive(Debug, Clone, Copy)]
pub struct VerbCall<'a> {
    pub url: &'a str,
    pub headers: &'a [(String, String)],
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub proxy: Option<&'a ProxyConfig>,
    pub bypass_cert_validation: bool,
}

/// The four fixed platform functions.
///
/// Implementations are expected to block until the host call completes;
/// the adapter performs exactly one of these calls per request.
pub trait HostVerbs {
    fn http_post(
        &self,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        post_data: Option<&str>,
    ) -> Result<String, HostIoError>;

    fn http_put(
        &self,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        put_data: Option<&str>,
    ) -> Result<String, HostIoError>;

    fn http_get(&self, call: &VerbCall<'_>) -> Result<String, HostIoError>;

    fn http_delete(&self, call: &VerbCall<'_>) -> Result<String, HostIoError>;
}

impl<H: HostVerbs + ?Sized> HostVerbs for &H {
    fn http_post(
        &self,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        post_data: Option<&str>,
    ) -> Result<String, HostIoError> {
        (**self).http_post(call, content_type, post_data)
    }

    fn http_put(
        &self,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        put_data: Option<&str>,
    ) -> Result<String, HostIoError> {
        (**self).http_put(call, content_type, put_data)
    }

    fn http_get(&self, call: &VerbCall<'_>) -> Result<String, HostIoError> {
        (**self).http_get(call)
    }

    fn http_delete(&self, call: &VerbCall<'_>) -> Result<String, HostIoError> {
        (**self).http_delete(call)
    }
}

/// An I/O failure raised by a host verb.
///
/// The message is the host's own rendering of the failure. When the
/// failure was an HTTP error status, hosts built on Java-style URL loaders
/// embed `HTTP response code: NNN for URL: ...` in the text; the `status`
/// module recovers the code from that convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIoError {
    message: String,
}

impl HostIoError {
    pub fn new(message: impl Into<String>) -> Self {
        HostIoError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HostIoError {}
