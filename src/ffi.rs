//! FFI interface for C/C++ hosts
//!
//! The host hands over the page HTML and address; results come back as JSON.
//! All strings in a returned [`ListingResultFFI`] are owned by Rust and must
//! be released with [`listing_free_result`].

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::ExtractorConfig;
use crate::logging::init_logging;
use crate::orchestrator::Extractor;
use crate::page::PageSnapshot;
use crate::relay::handle_request_json;

/// Result struct returned to the host.
///
/// - `json_ptr` set: a serialized extraction result
/// - `error_ptr` set: the call itself was invalid (bad pointers, bad UTF-8)
/// - both null: the request was not addressed to this handler
#[repr(C)]
pub struct ListingResultFFI {
    pub json_ptr: *mut c_char,
    pub error_ptr: *mut c_char,
}

/// Extract a listing from a page.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `url` - Page address (null-terminated), may be null
/// * `config_json` - Optional extractor config overrides (null-terminated), may be null
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `url` and `config_json` must be null or valid null-terminated C strings
/// - Caller must free the result via `listing_free_result`
#[no_mangle]
pub unsafe extern "C" fn listing_extract_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    url: *const c_char,
    config_json: *const c_char,
) -> ListingResultFFI {
    let html = match read_html(html_ptr, html_len) {
        Ok(h) => h,
        Err(msg) => return make_error_result(msg),
    };
    let url = match read_optional_cstr(url) {
        Ok(u) => u.unwrap_or_default(),
        Err(msg) => return make_error_result(msg),
    };
    let extractor = match build_extractor(config_json) {
        Ok(e) => e,
        Err(msg) => return make_error_result(&msg),
    };

    let page = PageSnapshot::from_html(html, url);
    match serde_json::to_string(&extractor.extract(&page)) {
        Ok(json) => make_json_result(json),
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

/// Handle a relay request such as `{"action":"extractListing"}` against a page.
///
/// `config_json` takes the same overrides as `listing_extract_ffi` and may be null.
///
/// # Safety
/// Same as `listing_extract_ffi`; `request_json` must be a valid
/// null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn listing_handle_request_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    url: *const c_char,
    request_json: *const c_char,
    config_json: *const c_char,
) -> ListingResultFFI {
    let html = match read_html(html_ptr, html_len) {
        Ok(h) => h,
        Err(msg) => return make_error_result(msg),
    };
    let url = match read_optional_cstr(url) {
        Ok(u) => u.unwrap_or_default(),
        Err(msg) => return make_error_result(msg),
    };
    let request = match read_optional_cstr(request_json) {
        Ok(Some(r)) => r,
        Ok(None) => return make_error_result("Request JSON is null"),
        Err(msg) => return make_error_result(msg),
    };
    let extractor = match build_extractor(config_json) {
        Ok(e) => e,
        Err(msg) => return make_error_result(&msg),
    };

    let page = PageSnapshot::from_html(html, url);
    match handle_request_json(&extractor, request, &page) {
        Some(json) => make_json_result(json),
        None => ListingResultFFI {
            json_ptr: ptr::null_mut(),
            error_ptr: ptr::null_mut(),
        },
    }
}

/// Free a result returned by this module
///
/// # Safety
/// - `result` must have been returned by one of the `listing_*_ffi` functions
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn listing_free_result(result: ListingResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

/// Install the log subscriber (filtered by `RUST_LOG`). Safe to call repeatedly.
#[no_mangle]
pub extern "C" fn listing_init_logging() -> bool {
    init_logging()
}

unsafe fn read_html<'a>(html_ptr: *const c_char, html_len: usize) -> Result<&'a str, &'static str> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok("");
    }
    let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8 in HTML content")
}

unsafe fn read_optional_cstr<'a>(ptr: *const c_char) -> Result<Option<&'a str>, &'static str> {
    if ptr.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(Some)
        .map_err(|_| "Invalid UTF-8 in string argument")
}

unsafe fn build_extractor(config_json: *const c_char) -> Result<Extractor, String> {
    let config = match read_optional_cstr(config_json)? {
        Some(json) => ExtractorConfig::from_json(json).map_err(|e| e.to_string())?,
        None => ExtractorConfig::default(),
    };
    Extractor::new(&config).map_err(|e| e.to_string())
}

fn make_json_result(json: String) -> ListingResultFFI {
    match CString::new(json) {
        Ok(cstr) => ListingResultFFI {
            json_ptr: cstr.into_raw(),
            error_ptr: ptr::null_mut(),
        },
        Err(_) => make_error_result("Result JSON contains null bytes"),
    }
}

fn make_error_result(msg: &str) -> ListingResultFFI {
    let error_cstr = CString::new(msg).unwrap_or_else(|_| CString::new("Unknown error").unwrap());
    ListingResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
