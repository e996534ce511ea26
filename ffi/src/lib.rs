//! C-ABI wrapper around `hostnet-core`.
//!
//! # Overview
//! Lets a C host hand over its four verb functions as a function table
//! and drive the adapter through one call: fill an `FfiRequestSpec`, call
//! `hostnet_request`, read back an `FfiOutcome`. The host keeps doing the
//! I/O; this library does the translation (form encoding, query
//! appending, verb dispatch, error normalization).
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so
//!   panics never cross the FFI boundary.
//! - `TableHost` adapts the C function table to the `HostVerbs` trait:
//!   it marshals each call into borrowed C views, copies reply strings
//!   out, and returns them through the table's `free_string`.
//! - `FfiOutcome` is a single envelope for usage errors and dispatched
//!   outcomes; the C caller owns it and must call `hostnet_free_outcome`.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use hostnet_core::{
    Body, FormParams, HostClient, HostIoError, HostVerbs, ProxyConfig, Request, VerbCall,
};

use types::*;

// ---------------------------------------------------------------------------
// Table-backed host
// ---------------------------------------------------------------------------

/// `HostVerbs` implementation that forwards every verb to the C table.
pub(crate) struct TableHost {
    table: FfiHostTable,
}

/// Owned C strings backing one `FfiVerbCall`. Kept alive for the
/// duration of the host invocation; the host borrows, never keeps.
struct MarshalledCall {
    url: CString,
    username: Option<CString>,
    password: Option<CString>,
    proxy_host: Option<CString>,
    _header_strings: Vec<(CString, CString)>,
    headers: Vec<FfiHeader>,
    connect_timeout_ms: u64,
    read_timeout_ms: u64,
    proxy_port: u16,
    bypass_cert_validation: bool,
}

impl MarshalledCall {
    fn new(call: &VerbCall<'_>) -> Self {
        let header_strings: Vec<(CString, CString)> = call
            .headers
            .iter()
            .map(|(k, v)| (c_string(k), c_string(v)))
            .collect();
        let headers: Vec<FfiHeader> = header_strings
            .iter()
            .map(|(k, v)| FfiHeader {
                key: k.as_ptr(),
                value: v.as_ptr(),
            })
            .collect();
        MarshalledCall {
            url: c_string(call.url),
            username: call.username.map(c_string),
            password: call.password.map(c_string),
            proxy_host: call.proxy.map(|p| c_string(&p.host)),
            _header_strings: header_strings,
            headers,
            connect_timeout_ms: call.connect_timeout_ms,
            read_timeout_ms: call.read_timeout_ms,
            proxy_port: call.proxy.map(|p| p.port).unwrap_or(0),
            bypass_cert_validation: call.bypass_cert_validation,
        }
    }

    fn as_ffi(&self) -> FfiVerbCall {
        FfiVerbCall {
            url: self.url.as_ptr(),
            headers: if self.headers.is_empty() {
                std::ptr::null()
            } else {
                self.headers.as_ptr()
            },
            headers_len: self.headers.len() as u32,
            username: opt_ptr(&self.username),
            password: opt_ptr(&self.password),
            connect_timeout_ms: self.connect_timeout_ms,
            read_timeout_ms: self.read_timeout_ms,
            proxy_host: opt_ptr(&self.proxy_host),
            proxy_port: self.proxy_port,
            bypass_cert_validation: self.bypass_cert_validation,
        }
    }
}

/// Interior NULs have no C representation; map such strings to empty.
fn c_string(s: &str) -> CString {
    CString::new(s).unwrap_or_default()
}

fn opt_ptr(s: &Option<CString>) -> *const c_char {
    s.as_ref().map_or(std::ptr::null(), |c| c.as_ptr())
}

impl TableHost {
    fn call_body_verb(
        &self,
        verb: FfiVerbBodyFn,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        data: Option<&str>,
    ) -> Result<String, HostIoError> {
        let marshalled = MarshalledCall::new(call);
        let ffi_call = marshalled.as_ffi();
        let ct = content_type.map(c_string);
        let payload = data.map(c_string);
        let mut reply = FfiVerbReply {
            body: std::ptr::null_mut(),
            error_message: std::ptr::null_mut(),
        };
        let rc = verb(
            self.table.ctx,
            &ffi_call,
            opt_ptr(&ct),
            opt_ptr(&payload),
            &mut reply,
        );
        self.take_reply(rc, reply)
    }

    fn call_verb(&self, verb: FfiVerbFn, call: &VerbCall<'_>) -> Result<String, HostIoError> {
        let marshalled = MarshalledCall::new(call);
        let ffi_call = marshalled.as_ffi();
        let mut reply = FfiVerbReply {
            body: std::ptr::null_mut(),
            error_message: std::ptr::null_mut(),
        };
        let rc = verb(self.table.ctx, &ffi_call, &mut reply);
        self.take_reply(rc, reply)
    }

    /// Turn a verb's return code and reply into the host contract: body
    /// text on success, the reported message on failure.
    fn take_reply(&self, rc: i32, reply: FfiVerbReply) -> Result<String, HostIoError> {
        let body = self.copy_and_free(reply.body);
        let error = self.copy_and_free(reply.error_message);
        if rc == 0 {
            Ok(body.unwrap_or_default())
        } else {
            Err(HostIoError::new(error.unwrap_or_else(|| {
                format!("host verb failed with code {rc}")
            })))
        }
    }

    /// Copy a host-allocated string out, then hand it back to the host's
    /// deallocator.
    fn copy_and_free(&self, s: *mut c_char) -> Option<String> {
        if s.is_null() {
            return None;
        }
        let copied = unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned();
        if let Some(free) = self.table.free_string {
            free(self.table.ctx, s);
        }
        Some(copied)
    }
}

impl HostVerbs for TableHost {
    fn http_post(
        &self,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        post_data: Option<&str>,
    ) -> Result<String, HostIoError> {
        match self.table.post {
            Some(f) => self.call_body_verb(f, call, content_type, post_data),
            None => Err(HostIoError::new("host table has no POST function")),
        }
    }

    fn http_put(
        &self,
        call: &VerbCall<'_>,
        content_type: Option<&str>,
        put_data: Option<&str>,
    ) -> Result<String, HostIoError> {
        match self.table.put {
            Some(f) => self.call_body_verb(f, call, content_type, put_data),
            None => Err(HostIoError::new("host table has no PUT function")),
        }
    }

    fn http_get(&self, call: &VerbCall<'_>) -> Result<String, HostIoError> {
        match self.table.get {
            Some(f) => self.call_verb(f, call),
            None => Err(HostIoError::new("host table has no GET function")),
        }
    }

    fn http_delete(&self, call: &VerbCall<'_>) -> Result<String, HostIoError> {
        match self.table.delete {
            Some(f) => self.call_verb(f, call),
            None => Err(HostIoError::new("host table has no DELETE function")),
        }
    }
}

// ---------------------------------------------------------------------------
// Shim lifecycle
// ---------------------------------------------------------------------------

/// Create an adapter bound to the host's verb table.
///
/// The table is copied; the host's functions and context must stay valid
/// for the shim's lifetime. Returns null if `table` is null or any of the
/// four verb functions is missing. The caller must free the result with
/// `hostnet_shim_free`.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_shim_new(table: *const FfiHostTable) -> *mut FfiShim {
    catch_unwind(|| {
        if table.is_null() {
            return std::ptr::null_mut();
        }
        let table = unsafe { *table };
        if table.post.is_none()
            || table.put.is_none()
            || table.get.is_none()
            || table.delete.is_none()
        {
            return std::ptr::null_mut();
        }
        let client = HostClient::new(TableHost { table });
        Box::into_raw(Box::new(FfiShim { client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a shim created by `hostnet_shim_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_shim_free(shim: *mut FfiShim) {
    if !shim.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(shim) });
        });
    }
}

// ---------------------------------------------------------------------------
// Proxy configuration
// ---------------------------------------------------------------------------

/// Store a proxy on the shim; requests without a proxy of their own use
/// it. `port` of 0 means the default port. Returns false when an
/// argument is null or not valid UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_shim_set_proxy(
    shim: *mut FfiShim,
    host: *const c_char,
    port: u16,
) -> bool {
    catch_unwind(|| {
        if shim.is_null() || host.is_null() {
            return false;
        }
        let shim = unsafe { &mut *shim };
        let host = match unsafe { CStr::from_ptr(host) }.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        let proxy = if port == 0 {
            ProxyConfig::new(host)
        } else {
            ProxyConfig::with_port(host, port)
        };
        shim.client.set_proxy(proxy);
        true
    })
    .unwrap_or(false)
}

/// Remove the stored proxy. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_shim_clear_proxy(shim: *mut FfiShim) {
    if !shim.is_null() {
        let _ = catch_unwind(|| {
            let shim = unsafe { &mut *shim };
            shim.client.clear_proxy();
        });
    }
}

/// The stored proxy host, copied; null when no proxy is set. Free with
/// `hostnet_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_shim_proxy_host(shim: *const FfiShim) -> *mut c_char {
    catch_unwind(|| {
        if shim.is_null() {
            return std::ptr::null_mut();
        }
        let shim = unsafe { &*shim };
        match shim.client.proxy() {
            Some(p) => c_string(&p.host).into_raw(),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The stored proxy port; 0 when no proxy is set.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_shim_proxy_port(shim: *const FfiShim) -> u16 {
    catch_unwind(|| {
        if shim.is_null() {
            return 0;
        }
        let shim = unsafe { &*shim };
        shim.client.proxy().map(|p| p.port).unwrap_or(0)
    })
    .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Request dispatch
// ---------------------------------------------------------------------------

/// Dispatch one request through the host's verb table.
///
/// Reads an `FfiRequestSpec`, performs exactly one host verb call, and
/// returns a heap-allocated `FfiOutcome`. Never returns null; the caller
/// must free the result with `hostnet_free_outcome`.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_request(
    shim: *const FfiShim,
    spec: *const FfiRequestSpec,
) -> *mut FfiOutcome {
    catch_unwind(|| {
        if shim.is_null() {
            return FfiOutcome::invalid(FfiErrorCode::NullArg, "null argument: shim");
        }
        if spec.is_null() {
            return FfiOutcome::invalid(FfiErrorCode::NullArg, "null argument: spec");
        }
        let shim = unsafe { &*shim };
        let spec = unsafe { &*spec };
        let req = match request_from_spec(spec) {
            Ok(req) => req,
            Err(invalid) => return invalid,
        };
        match shim.client.request(req) {
            Ok(outcome) => FfiOutcome::ok(outcome),
            Err(e) => FfiOutcome::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiOutcome::panic("panic in hostnet_request"))
}

/// Read a `Request` out of the C spec, validating strings and JSON. The
/// error side is a ready-made envelope.
fn request_from_spec(spec: &FfiRequestSpec) -> Result<Request, *mut FfiOutcome> {
    let method = required_str(spec.method, "method")?;
    let url = required_str(spec.url, "url")?;
    let mut req = Request::new(method, url);

    if spec.connect_timeout_ms > 0 {
        req.connect_timeout_ms = spec.connect_timeout_ms;
    }
    if spec.read_timeout_ms > 0 {
        req.read_timeout_ms = spec.read_timeout_ms;
    }

    if !spec.headers.is_null() && spec.headers_len > 0 {
        let headers =
            unsafe { std::slice::from_raw_parts(spec.headers, spec.headers_len as usize) };
        let mut out = Vec::with_capacity(headers.len());
        for h in headers {
            out.push((
                required_str(h.key, "header key")?.to_string(),
                required_str(h.value, "header value")?.to_string(),
            ));
        }
        req.headers = out;
    }

    req.content_type = optional_str(spec.content_type, "content_type")?.map(str::to_string);

    let raw = optional_str(spec.body_text, "body_text")?;
    let form = optional_str(spec.body_form_json, "body_form_json")?;
    req.body = match (raw, form) {
        (Some(_), Some(_)) => {
            return Err(FfiOutcome::invalid(
                FfiErrorCode::AmbiguousBody,
                "body_text and body_form_json are mutually exclusive",
            ))
        }
        (Some(text), None) => Some(Body::Raw(text.to_string())),
        (None, Some(json)) => Some(Body::Form(parse_form(json, "body_form_json")?)),
        (None, None) => None,
    };

    if let Some(json) = optional_str(spec.query_json, "query_json")? {
        req.query = Some(parse_form(json, "query_json")?);
    }

    req.username = optional_str(spec.username, "username")?.map(str::to_string);
    req.password = optional_str(spec.password, "password")?.map(str::to_string);

    if let Some(host) = optional_str(spec.proxy_host, "proxy_host")? {
        req.proxy = Some(if spec.proxy_port == 0 {
            ProxyConfig::new(host)
        } else {
            ProxyConfig::with_port(host, spec.proxy_port)
        });
    }
    req.bypass_cert_validation = spec.bypass_cert_validation;

    Ok(req)
}

fn required_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, *mut FfiOutcome> {
    if ptr.is_null() {
        return Err(FfiOutcome::invalid(
            FfiErrorCode::NullArg,
            &format!("null argument: {name}"),
        ));
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|_| {
        FfiOutcome::invalid(
            FfiErrorCode::InvalidUtf8,
            &format!("{name} is not valid UTF-8"),
        )
    })
}

fn optional_str<'a>(ptr: *const c_char, name: &str) -> Result<Option<&'a str>, *mut FfiOutcome> {
    if ptr.is_null() {
        return Ok(None);
    }
    required_str(ptr, name).map(Some)
}

fn parse_form(json: &str, name: &str) -> Result<FormParams, *mut FfiOutcome> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
        FfiOutcome::invalid(
            FfiErrorCode::BadJson,
            &format!("{name} is not valid JSON: {e}"),
        )
    })?;
    FormParams::from_json(&value).map_err(FfiOutcome::from_error)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiOutcome` returned by `hostnet_request`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_free_outcome(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        if !outcome.error_message.is_null() {
            drop(unsafe { CString::from_raw(outcome.error_message) });
        }
        if !outcome.body.is_null() {
            drop(unsafe { CString::from_raw(outcome.body) });
        }
        if !outcome.url.is_null() {
            drop(unsafe { CString::from_raw(outcome.url) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn hostnet_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
