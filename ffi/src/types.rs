//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Inputs borrow caller memory (`*const c_char`), outputs are heap
//! allocations the C side hands back to `reqkit_free_*`. The response body
//! is a raw byte buffer with an explicit length since it may contain NULs.

use std::ffi::CString;
use std::os::raw::c_char;

use reqkit_core::RequestError;

/// A single request header, borrowed from the caller.
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Error codes returned in `FfiSendResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidRequest = 1,
    Transport = 2,
    Status = 3,
    Body = 4,
    InvalidUrl = 5,
    UnknownMethod = 6,
    Panic = 7,
    NullArg = 8,
}

/// Result envelope for `reqkit_send`.
///
/// On success `error_code` is `Ok`, `error_message` is null and
/// `data`/`data_len` hold the response body (`data` is null when the body
/// is empty). On failure `error_message` is a C string, `http_status` is set
/// for `Status` errors and `data` is null.
#[repr(C)]
pub struct FfiSendResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data: *mut u8,
    pub data_len: usize,
}

impl FfiSendResult {
    pub(crate) fn ok(body: Vec<u8>) -> *mut Self {
        let data_len = body.len();
        let data = if body.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(body.into_boxed_slice()) as *mut u8
        };
        Box::into_raw(Box::new(FfiSendResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data,
            data_len,
        }))
    }

    pub(crate) fn from_error(err: RequestError) -> *mut Self {
        let error_code = match &err {
            RequestError::InvalidRequest(_) => FfiErrorCode::InvalidRequest,
            RequestError::Transport(_) => FfiErrorCode::Transport,
            RequestError::Status { .. } => FfiErrorCode::Status,
            RequestError::Body(_) => FfiErrorCode::Body,
            RequestError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            RequestError::UnknownMethod(_) => FfiErrorCode::UnknownMethod,
        };
        Self::failure(error_code, err.status().unwrap_or(0), &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg)
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiSendResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data: std::ptr::null_mut(),
            data_len: 0,
        }))
    }
}

/// Allocate a C string, dropping interior NULs (dumps may contain them).
pub(crate) fn c_string(s: &str) -> *mut c_char {
    let cleaned = if s.contains('\0') {
        s.replace('\0', "")
    } else {
        s.to_string()
    };
    CString::new(cleaned).unwrap_or_default().into_raw()
}
