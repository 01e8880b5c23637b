//! C-ABI wrapper around `reqkit-core`.
//!
//! # Overview
//! Exposes request sending and the URL helpers through `extern "C"`
//! functions, so any language with a C FFI can issue a request without
//! linking against Rust's HTTP stack directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Methods cross the boundary as their numeric code (HEAD=0 .. DELETE=4);
//!   other codes produce an `UnknownMethod` result.
//! - `reqkit_send` returns a single `FfiSendResult` envelope for both the
//!   body and any error.
//! - The C caller owns every returned pointer and releases it with
//!   `reqkit_free_result` or `reqkit_free_string`.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::str::Utf8Error;

use reqkit_core::{Headers, HttpMethod, RequestError};

use types::*;

/// Borrow a C string as `&str`.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string that
/// outlives the returned slice.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Result<&'a str, Utf8Error> {
    CStr::from_ptr(ptr).to_str()
}

/// Borrow a request input, reporting invalid UTF-8 as `InvalidRequest`
/// naming the offending argument.
///
/// # Safety
/// Same contract as `borrow_str`.
unsafe fn request_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, RequestError> {
    borrow_str(ptr).map_err(|e| RequestError::InvalidRequest(format!("{name} is not valid UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Request sending
// ---------------------------------------------------------------------------

/// Send one HTTP request and return the response body or an error.
///
/// `body` may be null (empty body). `headers` may be null when
/// `headers_len` is 0; every header entry must have a non-null key and value.
/// The url, body and every header key and value must be valid UTF-8;
/// otherwise nothing is sent and the result is `InvalidRequest`.
/// The caller must free the returned pointer with `reqkit_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_send(
    method: u8,
    url: *const c_char,
    body: *const c_char,
    headers: *const FfiHeader,
    headers_len: u32,
) -> *mut FfiSendResult {
    catch_unwind(|| {
        if url.is_null() {
            return FfiSendResult::null_arg("url");
        }
        if headers.is_null() && headers_len > 0 {
            return FfiSendResult::null_arg("headers");
        }
        let method = match HttpMethod::try_from(method) {
            Ok(m) => m,
            Err(e) => return FfiSendResult::from_error(e),
        };
        let entries = if headers_len == 0 {
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts(headers, headers_len as usize) }
        };
        if entries.iter().any(|e| e.key.is_null() || e.value.is_null()) {
            return FfiSendResult::null_arg("header");
        }

        let sent = unsafe { send_borrowed(method, url, body, entries) };

        match sent {
            Ok(bytes) => FfiSendResult::ok(bytes),
            Err(e) => FfiSendResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSendResult::panic("panic in reqkit_send"))
}

/// Read the caller's inputs and send. Invalid UTF-8 in any of them fails
/// with `InvalidRequest` before anything goes over the wire.
///
/// # Safety
/// `url` and every header key and value must be non-null NUL-terminated
/// strings; `body` may be null.
unsafe fn send_borrowed(
    method: HttpMethod,
    url: *const c_char,
    body: *const c_char,
    entries: &[FfiHeader],
) -> Result<Vec<u8>, RequestError> {
    let url = request_str(url, "url")?;
    let body = if body.is_null() { "" } else { request_str(body, "body")? };
    let headers = if entries.is_empty() {
        None
    } else {
        let mut map = Headers::new();
        for entry in entries {
            let key = request_str(entry.key, "header key")?;
            let value = request_str(entry.value, "header value")?;
            map.insert(key.to_string(), value.to_string());
        }
        Some(map)
    };
    reqkit_core::send(method, url, body, headers.as_ref())
}

// ---------------------------------------------------------------------------
// Method and URL helpers
// ---------------------------------------------------------------------------

/// Name of a method code, `Unknown(<code>)` for codes outside 0..=4.
/// The caller must free the returned string with `reqkit_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_method_name(code: u8) -> *mut c_char {
    catch_unwind(|| c_string(&reqkit_core::method_name(code))).unwrap_or(std::ptr::null_mut())
}

/// Join `segments` onto `base`. Returns null if `base` is null, if
/// `segments` or any entry in it is null while `segments_len > 0`, or if
/// any input is not valid UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_join_url(
    base: *const c_char,
    segments: *const *const c_char,
    segments_len: u32,
) -> *mut c_char {
    catch_unwind(|| {
        if base.is_null() || (segments.is_null() && segments_len > 0) {
            return std::ptr::null_mut();
        }
        let Ok(base) = (unsafe { borrow_str(base) }) else {
            return std::ptr::null_mut();
        };
        let mut parts: Vec<&str> = Vec::with_capacity(segments_len as usize);
        if segments_len > 0 {
            let raw = unsafe { std::slice::from_raw_parts(segments, segments_len as usize) };
            for &segment in raw {
                if segment.is_null() {
                    return std::ptr::null_mut();
                }
                match unsafe { borrow_str(segment) } {
                    Ok(part) => parts.push(part),
                    Err(_) => return std::ptr::null_mut(),
                }
            }
        }
        c_string(&reqkit_core::join_url(base, &parts))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Everything before the last `/` of `url`. Returns null if `url` is null
/// or not valid UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_base_url(url: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        if url.is_null() {
            return std::ptr::null_mut();
        }
        match unsafe { borrow_str(url) } {
            Ok(url) => c_string(reqkit_core::base_url(url)),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Multi-line description of a URL. Returns null if `url` is null, not
/// valid UTF-8, or cannot be parsed.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_parse_url(url: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        if url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = (unsafe { borrow_str(url) }) else {
            return std::ptr::null_mut();
        };
        match reqkit_core::parse_url(url) {
            Ok(described) => c_string(&described),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiSendResult` returned by `reqkit_send`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_free_result(result: *mut FfiSendResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() && result.data_len > 0 {
            let data = std::ptr::slice_from_raw_parts_mut(result.data, result.data_len);
            drop(unsafe { Box::from_raw(data) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn reqkit_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
