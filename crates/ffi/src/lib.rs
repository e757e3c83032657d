//! C ABI for primeshot.
//!
//! Every export returns an [`ErrorCode`] (a C `int`). Paths are
//! NUL-terminated UTF-8. Buffers handed out by
//! [`primeshot_capture_screen_to_memory`] come from `malloc` and are
//! released with [`primeshot_free_buffer`]. Strings handed out are static.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use primeshot_capture_engine::{CaptureOptions, ScreenCapture};
use primeshot_common::error::ErrorCode;

const LIBRARY_VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(
        "primeshot ",
        env!("CARGO_PKG_VERSION"),
        " - Windows Graphics Capture\0"
    )
    .as_bytes(),
) {
    Ok(version) => version,
    Err(_) => c"primeshot",
};

/// Run `f`, turning a panic into `UnknownError`.
fn guarded<F>(f: F) -> ErrorCode
where
    F: FnOnce() -> ErrorCode,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        tracing::error!("panic inside primeshot call");
        ErrorCode::UnknownError
    })
}

/// Borrow a caller path. Null, empty and non-UTF-8 paths are rejected.
///
/// # Safety
/// `path` must be null or point to a NUL-terminated string.
unsafe fn path_arg(path: *const c_char) -> Result<PathBuf, ErrorCode> {
    if path.is_null() {
        return Err(ErrorCode::InvalidParameter);
    }
    let path = CStr::from_ptr(path)
        .to_str()
        .map_err(|_| ErrorCode::InvalidParameter)?;
    if path.is_empty() {
        return Err(ErrorCode::InvalidParameter);
    }
    Ok(PathBuf::from(path))
}

fn options(hide_border: c_int, hide_cursor: c_int) -> CaptureOptions {
    CaptureOptions {
        hide_border: hide_border != 0,
        hide_cursor: hide_cursor != 0,
    }
}

/// Capture the primary monitor to a PNG file, hiding border and cursor.
///
/// # Safety
/// `output_path` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn primeshot_capture_screen(output_path: *const c_char) -> ErrorCode {
    primeshot_capture_screen_with_options(output_path, 1, 1)
}

/// Capture the primary monitor to a PNG file. Non-zero flags hide the
/// capture border and the cursor.
///
/// # Safety
/// `output_path` must be null or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn primeshot_capture_screen_with_options(
    output_path: *const c_char,
    hide_border: c_int,
    hide_cursor: c_int,
) -> ErrorCode {
    guarded(|| {
        let path = match path_arg(output_path) {
            Ok(path) => path,
            Err(code) => return code,
        };
        ScreenCapture::new().capture_to_file(&path, options(hide_border, hide_cursor))
    })
}

/// Capture the primary monitor to an in-memory PNG.
///
/// On success `*out_data` receives a `malloc`ed buffer of `*out_len`
/// bytes. On failure they are set to null and zero.
///
/// # Safety
/// `out_data` and `out_len` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn primeshot_capture_screen_to_memory(
    out_data: *mut *mut u8,
    out_len: *mut usize,
    hide_border: c_int,
    hide_cursor: c_int,
) -> ErrorCode {
    if out_data.is_null() || out_len.is_null() {
        return ErrorCode::InvalidParameter;
    }
    *out_data = std::ptr::null_mut();
    *out_len = 0;

    guarded(|| {
        let png = match ScreenCapture::new().capture_to_memory(options(hide_border, hide_cursor)) {
            Ok(png) => png,
            Err(code) => return code,
        };
        match copy_to_malloc(&png) {
            Some(ptr) => {
                *out_data = ptr;
                *out_len = png.len();
                ErrorCode::Success
            }
            None => {
                tracing::error!(bytes = png.len(), "cannot allocate output buffer");
                ErrorCode::UnknownError
            }
        }
    })
}

fn copy_to_malloc(bytes: &[u8]) -> Option<*mut u8> {
    if bytes.is_empty() {
        return None;
    }
    // SAFETY: the allocation is checked for null and is exactly
    // `bytes.len()` long, so the copy stays in bounds.
    unsafe {
        let ptr = libc::malloc(bytes.len()) as *mut u8;
        if ptr.is_null() {
            return None;
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
        Some(ptr)
    }
}

/// Release a buffer from [`primeshot_capture_screen_to_memory`]. Null is
/// ignored.
///
/// # Safety
/// `data` must be null or a pointer this library returned and that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn primeshot_free_buffer(data: *mut u8) {
    if !data.is_null() {
        libc::free(data as *mut c_void);
    }
}

/// Static description of a result code. Unknown values describe
/// `UnknownError`.
#[no_mangle]
pub extern "C" fn primeshot_error_description(code: c_int) -> *const c_char {
    ErrorCode::from_i32(code)
        .unwrap_or(ErrorCode::UnknownError)
        .description_cstr()
        .as_ptr()
}

/// Static library version string.
#[no_mangle]
pub extern "C" fn primeshot_library_version() -> *const c_char {
    LIBRARY_VERSION.as_ptr()
}
