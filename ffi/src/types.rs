//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Two families of types cross this boundary. The host FILLS IN the verb
//! function table (`FfiHostTable`), the request description
//! (`FfiRequestSpec`), and verb replies (`FfiVerbReply`); those use
//! `*const` fields this library only reads. This library ALLOCATES the
//! result envelope (`FfiOutcome`), which the caller frees through
//! `hostnet_free_outcome`. Conversion helpers live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::{c_char, c_void};

use hostnet_core::{HostClient, Outcome, RequestError};

use crate::TableHost;

/// Opaque handle owning the adapter bound to one host verb table. C
/// callers receive a pointer to this and pass it back into every call.
pub struct FfiShim {
    pub(crate) client: HostClient<TableHost>,
}

// ---------------------------------------------------------------------------
// Host verb table
// ---------------------------------------------------------------------------

/// A single header pair. Both pointers borrow memory owned by whichever
/// side constructed the enclosing struct.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Parameters of one host verb invocation, as seen from C.
///
/// All pointers borrow memory owned by this library for the duration of
/// the call; the host must copy anything it wants to keep. Optional
/// strings are null when absent, and `proxy_host` null means no proxy.
#[repr(C)]
pub struct FfiVerbCall {
    pub url: *const c_char,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub username: *const c_char,
    pub password: *const c_char,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub proxy_host: *const c_char,
    pub proxy_port: u16,
    pub bypass_cert_validation: bool,
}

/// Where a host verb function leaves its result.
///
/// On success the host sets `body` and returns 0; on failure it sets
/// `error_message` and returns nonzero. Strings are allocated by the
/// host; after copying them out, this library hands each back through
/// the table's `free_string`.
#[repr(C)]
pub struct FfiVerbReply {
    pub body: *mut c_char,
    pub error_message: *mut c_char,
}

/// Host verb that carries a payload (POST, PUT). `content_type` and
/// `data` may be null. Returns 0 on success.
pub type FfiVerbBodyFn = extern "C" fn(
    ctx: *mut c_void,
    call: *const FfiVerbCall,
    content_type: *const c_char,
    data: *const c_char,
    reply: *mut FfiVerbReply,
) -> i32;

/// Host verb without a payload (GET, DELETE). Returns 0 on success.
pub type FfiVerbFn =
    extern "C" fn(ctx: *mut c_void, call: *const FfiVerbCall, reply: *mut FfiVerbReply) -> i32;

/// Deallocator for strings the host placed in an `FfiVerbReply`.
pub type FfiFreeStringFn = extern "C" fn(ctx: *mut c_void, s: *mut c_char);

/// The four platform verb functions plus their shared context pointer.
///
/// `Option` makes a null function pointer representable;
/// `hostnet_shim_new` rejects tables with any verb missing.
/// `free_string` may be null when the host's reply strings need no
/// explicit release.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiHostTable {
    pub ctx: *mut c_void,
    pub post: Option<FfiVerbBodyFn>,
    pub put: Option<FfiVerbBodyFn>,
    pub get: Option<FfiVerbFn>,
    pub delete: Option<FfiVerbFn>,
    pub free_string: Option<FfiFreeStringFn>,
}

// ---------------------------------------------------------------------------
// Request description (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// One request, described from C.
///
/// `method` and `url` are required; every other pointer may be null.
/// Zero timeouts mean the defaults (10s connect, 60s read). At most one
/// of `body_text` / `body_form_json` may be set; `body_form_json` and
/// `query_json` hold JSON objects validated on this side of the
/// boundary. `proxy_port` of 0 means the default proxy port when
/// `proxy_host` is set.
#[repr(C)]
pub struct FfiRequestSpec {
    pub method: *const c_char,
    pub url: *const c_char,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub content_type: *const c_char,
    pub body_text: *const c_char,
    pub body_form_json: *const c_char,
    pub query_json: *const c_char,
    pub username: *const c_char,
    pub password: *const c_char,
    pub proxy_host: *const c_char,
    pub proxy_port: u16,
    pub bypass_cert_validation: bool,
}

// ---------------------------------------------------------------------------
// Outcome envelope
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiOutcome`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    BadJson = 3,
    UnsupportedMethod = 4,
    UnsupportedValue = 5,
    AmbiguousBody = 6,
    Panic = 7,
}

/// Result envelope for `hostnet_request`.
///
/// `error_code == Ok` means the request was dispatched and `status`,
/// `body`, and `url` carry the outcome; host I/O failures land here too,
/// as an elevated status and a JSON error body. Any other code means the
/// call itself was unusable, `error_message` says why, and the outcome
/// fields are unset. The caller owns the result and must free it with
/// `hostnet_free_outcome`.
#[repr(C)]
pub struct FfiOutcome {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub status: u16,
    pub body: *mut c_char,
    pub url: *mut c_char,
}

impl FfiOutcome {
    /// Build a success envelope from a dispatched outcome.
    pub(crate) fn ok(outcome: Outcome) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            status: outcome.status,
            body: into_c_string(outcome.body),
            url: into_c_string(outcome.url),
        }))
    }

    /// Build an error envelope from a core usage error.
    pub(crate) fn from_error(err: RequestError) -> *mut Self {
        let code = match &err {
            RequestError::UnsupportedMethod(_) => FfiErrorCode::UnsupportedMethod,
            RequestError::UnsupportedValue { .. } => FfiErrorCode::UnsupportedValue,
        };
        Self::invalid(code, &err.to_string())
    }

    /// Build an error envelope for a call that never reached dispatch.
    pub(crate) fn invalid(code: FfiErrorCode, message: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            error_code: code,
            error_message: into_c_string(message.to_string()),
            status: 0,
            body: std::ptr::null_mut(),
            url: std::ptr::null_mut(),
        }))
    }

    /// Build an error envelope for a caught panic.
    pub(crate) fn panic(message: &str) -> *mut Self {
        Self::invalid(FfiErrorCode::Panic, message)
    }
}

/// Allocate a C string for the caller. Interior NULs cannot reach here:
/// every string either crossed the boundary as a C string already or was
/// rendered by serde_json.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}
