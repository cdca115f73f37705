//! C-FFI layer for the CSP parser - used by Go (cgo) and other FFI consumers.
//!
//! ZERO logic here. All calls delegate to `csp-core`.
//!
//! # Output
//!
//! Parse calls return JSON:
//! `{ "policies": [...], "valid": bool, "notices": [...] }`
//!
//! # Memory Contract
//!
//! All functions that return `*mut c_char` allocate via `CString`.
//! The caller MUST free the returned string by calling `csp_free_string()`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use csp_core::{Notice, Policy, Url};

/// Result from a CSP FFI call.
/// If `error` is null, the call succeeded and `result` contains the output.
/// If `error` is non-null, the call failed and `error` contains the error message.
/// The caller MUST free both `result` and `error` with `csp_free_string()`.
#[repr(C)]
pub struct CspResult {
    pub result: *mut c_char,
    pub error: *mut c_char,
}

impl CspResult {
    fn ok(value: String) -> Self {
        let c = CString::new(value).unwrap_or_default();
        CspResult {
            result: c.into_raw(),
            error: std::ptr::null_mut(),
        }
    }

    fn err(msg: String) -> Self {
        let c = CString::new(msg)
            .or_else(|_| CString::new("unknown error"))
            .unwrap_or_default();
        CspResult {
            result: std::ptr::null_mut(),
            error: c.into_raw(),
        }
    }
}

/// Helper: convert a C string pointer to a Rust &str.
/// Returns None if the pointer is null or not valid UTF-8.
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn to_json(policies: &[Policy], notices: &[Notice]) -> CspResult {
    let output = serde_json::json!({
        "policies": policies,
        "valid": !notices.iter().any(Notice::is_error),
        "notices": notices,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => CspResult::ok(json),
        Err(e) => CspResult::err(csp_core::Error::Serialization(e.to_string()).to_string()),
    }
}

/// Decode both arguments, or say which one is unusable.
unsafe fn read_args<'a>(
    text: *const c_char,
    origin: *const c_char,
) -> Result<(&'a str, Url), CspResult> {
    let text = cstr_to_str(text).ok_or_else(|| CspResult::err("null or invalid UTF-8 text".into()))?;
    let origin = cstr_to_str(origin)
        .ok_or_else(|| CspResult::err("null or invalid UTF-8 origin".into()))?;
    let origin = csp_core::parse_origin(origin).map_err(|e| CspResult::err(e.to_string()))?;
    Ok((text, origin))
}

/// Parse a single CSP policy against `origin` (an absolute URL).
/// Returns JSON: { "policies": [policy], "valid": bool, "notices": [...] }
///
/// # Safety
/// `text` and `origin` must be valid null-terminated UTF-8 C strings.
/// The caller must free the returned strings with `csp_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn csp_parse(text: *const c_char, origin: *const c_char) -> CspResult {
    let (text, origin) = match read_args(text, origin) {
        Ok(args) => args,
        Err(e) => return e,
    };

    let parsed = csp_core::parse(text, &origin);
    to_json(std::slice::from_ref(&parsed.value), &parsed.notices)
}

/// Parse a comma-separated list of CSP policies against `origin`.
/// Returns JSON: { "policies": [...], "valid": bool, "notices": [...] }
///
/// # Safety
/// `text` and `origin` must be valid null-terminated UTF-8 C strings.
/// The caller must free the returned strings with `csp_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn csp_parse_multi(text: *const c_char, origin: *const c_char) -> CspResult {
    let (text, origin) = match read_args(text, origin) {
        Ok(args) => args,
        Err(e) => return e,
    };

    let parsed = csp_core::parse_multi(text, &origin);
    to_json(&parsed.value, &parsed.notices)
}

/// Free a string previously returned by a CSP FFI function.
///
/// # Safety
/// `ptr` must be a pointer previously returned by a CSP FFI function,
/// or null (in which case this is a no-op).
#[no_mangle]
pub unsafe extern "C" fn csp_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
