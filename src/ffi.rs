//! C exports.
//!
//! ```c
//! double   get_duration(const char* path);                    // -1.0 on error
//! int32_t  get_frame_count(const char* path);                 // -1 on error
//! uint8_t* extract_frame(const char* path, int32_t frame,
//!                        int32_t* out_size);                  // NULL on error
//! void     free_frame(uint8_t* buffer);                       // NULL is a no-op
//! ```
//!
//! Every call opens the file itself and releases everything it opened
//! before returning; calls on different files may run concurrently. Errors
//! are logged at debug level and collapsed into the sentinel. Panics are
//! caught here and never unwind into the caller.
//!
//! Buffers returned by `extract_frame` belong to the caller and must be
//! released exactly once with `free_frame`. Releasing a buffer twice, or
//! passing a pointer that `extract_frame` did not return, is undefined
//! behaviour.

use std::{
    ffi::{CStr, c_char},
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    ptr,
};

use crate::{
    buffer::FrameBuffer, configuration::ExtractOptions, error::ProbeError,
    extractor::extract_frame_buffer, resolver,
};

const DURATION_ERROR: f64 = -1.0;
const FRAME_COUNT_ERROR: i32 = -1;

/// Duration of the media at `path` in seconds, or `-1.0`.
///
/// # Safety
///
/// `path` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_duration(path: *const c_char) -> f64 {
    guarded("get_duration", DURATION_ERROR, || {
        let path = unsafe { path_from_c(path) }?;
        resolver::duration_seconds(path)
    })
}

/// Estimated frame count of the primary video track, or `-1`.
///
/// # Safety
///
/// Same requirements as [`get_duration`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_frame_count(path: *const c_char) -> i32 {
    guarded("get_frame_count", FRAME_COUNT_ERROR, || {
        let path = unsafe { path_from_c(path) }?;
        resolver::frame_count(path)
    })
}

/// Extract frame `frame_index` as JPEG bytes.
///
/// On success the byte length is written to `*out_size` and an owned
/// buffer is returned. On failure NULL is returned and `*out_size` is not
/// written. A NULL `out_size` fails immediately.
///
/// # Safety
///
/// `path` must satisfy the requirements of [`get_duration`]; `out_size`
/// must be null or valid for a single `int32_t` write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn extract_frame(
    path: *const c_char,
    frame_index: i32,
    out_size: *mut i32,
) -> *mut u8 {
    if out_size.is_null() {
        log::debug!("extract_frame called without an output size slot");
        return ptr::null_mut();
    }

    guarded("extract_frame", ptr::null_mut(), || {
        let path = unsafe { path_from_c(path) }?;
        let buffer = extract_frame_buffer(path, frame_index, &ExtractOptions::default())?;
        let size = i32::try_from(buffer.len())
            .map_err(|_| ProbeError::BufferTooLarge(buffer.len()))?;
        let (pointer, _) = buffer.into_raw();
        unsafe { out_size.write(size) };
        Ok(pointer)
    })
}

/// Release a buffer returned by [`extract_frame`]. NULL is ignored.
///
/// # Safety
///
/// `buffer` must be null or a pointer returned by [`extract_frame`] that
/// has not already been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_frame(buffer: *mut u8) {
    unsafe { FrameBuffer::release(buffer) }
}

/// Run `body`, mapping errors and panics to `sentinel`.
fn guarded<T>(
    operation: &str,
    sentinel: T,
    body: impl FnOnce() -> Result<T, ProbeError>,
) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => {
            log::debug!("{operation} failed: {error}");
            sentinel
        }
        Err(_) => {
            log::error!("{operation} panicked; returning error sentinel");
            sentinel
        }
    }
}

/// Borrow a C string as a path.
///
/// On Unix any byte string is accepted; elsewhere it must be UTF-8.
unsafe fn path_from_c(path: *const c_char) -> Result<PathBuf, ProbeError> {
    if path.is_null() {
        return Err(ProbeError::InvalidPath("path is null".to_string()));
    }
    let bytes = unsafe { CStr::from_ptr(path) }.to_bytes();
    if bytes.is_empty() {
        return Err(ProbeError::InvalidPath("path is empty".to_string()));
    }

    #[cfg(unix)]
    {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};
        Ok(PathBuf::from(OsStr::from_bytes(bytes)))
    }

    #[cfg(not(unix))]
    {
        std::str::from_utf8(bytes)
            .map(PathBuf::from)
            .map_err(|_| ProbeError::InvalidPath("path is not valid UTF-8".to_string()))
    }
}
