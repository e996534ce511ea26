//! The request adapter: one uniform call in, one host verb call out.
//!
//! # Design
//! `HostClient` owns a host handle (anything implementing `HostVerbs`) and
//! the stored proxy configuration. `request` is synchronous and blocking:
//! it encodes the body, appends query parameters, picks the verb, invokes
//! exactly one host function, and waits. Host I/O failures do not bubble
//! up as `Err`; they come back as an `Outcome` whose status is recovered
//! from the error text (466 when unrecoverable) and whose body is a JSON
//! `{"Error": ...}` object, so callers handle network trouble as data.

use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::RequestError;
use crate::form::FORM_URLENCODED;
use crate::host::{HostIoError, HostVerbs, ProxyConfig, VerbCall};
use crate::request::{Body, Method, Outcome, Request};
use crate::status::status_from_message;

/// Adapter between a uniform request description and the host's four verb
/// primitives.
///
/// The proxy configuration is instance state, injected at construction or
/// set explicitly; requests that carry no proxy of their own fall back to
/// it. Cloning the host handle is the caller's business, so concurrent use
/// means one client per thread or a shared reference.
#[derive(Debug)]
pub struct HostClient<H: HostVerbs> {
    host: H,
    proxy: Option<ProxyConfig>,
}

impl<H: HostVerbs> HostClient<H> {
    pub fn new(host: H) -> Self {
        HostClient { host, proxy: None }
    }

    /// Construct with a proxy already stored.
    pub fn with_proxy(host: H, proxy: ProxyConfig) -> Self {
        HostClient {
            host,
            proxy: Some(proxy),
        }
    }

    /// Store a proxy for subsequent requests that do not carry their own.
    pub fn set_proxy(&mut self, proxy: ProxyConfig) {
        self.proxy = Some(proxy);
    }

    /// Drop the stored proxy.
    pub fn clear_proxy(&mut self) {
        self.proxy = None;
    }

    /// The stored proxy configuration, if any.
    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    /// Perform one request through the host.
    ///
    /// Returns `Err` only for usage errors (an unsupported method; form
    /// payloads are validated when built). Every network-level result,
    /// success or failure, is an `Ok(Outcome)` carrying the final URL the
    /// host was given.
    pub fn request(&self, req: Request) -> Result<Outcome, RequestError> {
        let Request {
            method,
            mut url,
            connect_timeout_ms,
            read_timeout_ms,
            headers,
            mut content_type,
            body,
            query,
            username,
            password,
            proxy: call_proxy,
            bypass_cert_validation,
        } = req;

        let proxy = call_proxy.as_ref().or(self.proxy.as_ref());

        // A mapping body is form-encoded and, when the caller set no
        // content type, forces the urlencoded media type. A raw body
        // passes through untouched.
        let data = match body {
            None => None,
            Some(Body::Raw(text)) => Some(text),
            Some(Body::Form(params)) => {
                if content_type.is_none() {
                    content_type = Some(FORM_URLENCODED.to_string());
                }
                Some(params.encode())
            }
        };

        // Query parameters always append, even when they encode to "":
        // `&` if the URL already carries a query string, `?` otherwise.
        if let Some(params) = query {
            url.push(if has_query_string(&url) { '&' } else { '?' });
            url.push_str(&params.encode());
        }

        let verb = Method::from_str(&method)?;

        let call = VerbCall {
            url: &url,
            headers: &headers,
            username: username.as_deref(),
            password: password.as_deref(),
            connect_timeout_ms,
            read_timeout_ms,
            proxy,
            bypass_cert_validation,
        };

        debug!(method = verb.as_str(), url = call.url, "dispatching host verb");

        let result = match verb {
            Method::Post => self
                .host
                .http_post(&call, content_type.as_deref(), data.as_deref()),
            Method::Put => self
                .host
                .http_put(&call, content_type.as_deref(), data.as_deref()),
            Method::Get => self.host.http_get(&call),
            Method::Delete => self.host.http_delete(&call),
        };

        Ok(match result {
            // The host signals success without a status code, so success
            // is always reported as 200.
            Ok(body) => Outcome {
                status: 200,
                body,
                url,
            },
            Err(err) => host_failure(err, url),
        })
    }
}

/// Whether the URL already carries a non-empty query string. The query
/// lives between `?` and any `#` fragment, so a bare trailing `?` or a
/// `?` inside the fragment does not count.
fn has_query_string(url: &str) -> bool {
    let head = url.split_once('#').map_or(url, |(head, _)| head);
    match head.split_once('?') {
        Some((_, rest)) => !rest.is_empty(),
        None => false,
    }
}

/// Normalize a host I/O failure into an outcome: status recovered from
/// the message, body a JSON object carrying the text verbatim.
fn host_failure(err: HostIoError, url: String) -> Outcome {
    let status = status_from_message(err.message());
    warn!(status, url = url.as_str(), "host verb failed: {err}");
    Outcome {
        status,
        body: serde_json::json!({ "Error": err.message() }).to_string(),
        url,
    }
}
