//! Request and result types for the host-verb adapter.
//!
//! # Design
//! Everything here is plain data with owned fields, mirroring the calling
//! convention of a conventional HTTP client: the caller describes one
//! request, `HostClient` translates it into a single host verb invocation.
//! The method stays a string until dispatch because the adapted interface
//! is string-typed; `Method` is the closed set of verbs the host actually
//! provides. `Outcome` derives serde so test vectors can deserialize
//! expected results directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::form::FormParams;
use crate::host::ProxyConfig;

/// Default time in milliseconds to wait for the connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default time in milliseconds to wait for a response.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;

/// The four verbs the host platform provides. There are no others: the
/// platform exposes one fixed function per verb and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Get,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Get => "GET",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb names match exactly and case-sensitively: the runtime convention
/// is uppercase, and `"get"` is as unsupported as `"PATCH"`.
impl FromStr for Method {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "GET" => Ok(Method::Get),
            "DELETE" => Ok(Method::Delete),
            other => Err(RequestError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Request payload: either a pre-formatted string passed through verbatim,
/// or a mapping that is form-encoded before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Raw(String),
    Form(FormParams),
}

/// Plain-data description of one request.
///
/// Only `method` and `url` are required; everything else defaults to the
/// host interface's conventions (10s connect / 60s read timeouts, no
/// headers, no body, no proxy, certificate validation on).
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub body: Option<Body>,
    pub query: Option<FormParams>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-call proxy; wins over the client's stored proxy for this call
    /// only.
    pub proxy: Option<ProxyConfig>,
    pub bypass_cert_validation: bool,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Request {
            method: method.into(),
            url: url.into(),
            ..Request::default()
        }
    }
}

impl Default for Request {
    fn default() -> Self {
        Request {
            method: String::new(),
            url: String::new(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            headers: Vec::new(),
            content_type: None,
            body: None,
            query: None,
            username: None,
            password: None,
            proxy: None,
            bypass_cert_validation: false,
        }
    }
}

/// What every request resolves to: status code, body text, and the URL
/// that was actually dispatched (query string included).
///
/// Host failures land here too, as an elevated status and a JSON error
/// body, so callers see one shape for every network-level result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: u16,
    pub body: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_the_four_verbs() {
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("PUT".parse::<Method>().unwrap(), Method::Put);
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn method_rejects_anything_else() {
        let err = "PATCH".parse::<Method>().unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedMethod(m) if m == "PATCH"));
    }

    #[test]
    fn method_matching_is_case_sensitive() {
        assert!("get".parse::<Method>().is_err());
        assert!("Post".parse::<Method>().is_err());
    }

    #[test]
    fn new_request_uses_default_timeouts() {
        let req = Request::new("GET", "http://example.com/");
        assert_eq!(req.connect_timeout_ms, 10_000);
        assert_eq!(req.read_timeout_ms, 60_000);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
        assert!(!req.bypass_cert_validation);
    }
}
