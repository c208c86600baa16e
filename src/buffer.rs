//! Owned byte buffers that cross the C boundary.
//!
//! The C API hands out a bare `uint8_t*` and takes back the same pointer in
//! `free_frame`, with no length. [`FrameBuffer`] therefore allocates a small
//! header in front of the payload that records the allocation size; the
//! pointer given to C points just past that header. Allocation and release
//! both go through the Rust global allocator with the same layout.
//!
//! Ownership rules:
//!
//! - [`FrameBuffer::into_raw`] transfers ownership to the caller; the buffer
//!   is no longer tracked on the Rust side.
//! - [`FrameBuffer::release`] takes it back and frees it. Passing a pointer
//!   twice, or a pointer that did not come from `into_raw`, is undefined
//!   behaviour.

use std::{
    alloc::{self, Layout},
    fmt::{Debug, Formatter, Result as FmtResult},
    mem,
    ptr::{self, NonNull},
    slice,
};

use crate::error::ProbeError;

/// Bytes reserved before the payload to store its length.
const HEADER_SIZE: usize = mem::size_of::<usize>();
const ALIGNMENT: usize = mem::align_of::<usize>();

/// An owned, contiguous, non-empty byte buffer.
pub struct FrameBuffer {
    /// Start of the payload (one header past the allocation start).
    payload: NonNull<u8>,
    length: usize,
}

// The buffer is uniquely owned heap memory.
unsafe impl Send for FrameBuffer {}
unsafe impl Sync for FrameBuffer {}

impl Debug for FrameBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameBuffer")
            .field("length", &self.length)
            .finish()
    }
}

impl FrameBuffer {
    /// Allocate a buffer sized exactly to `bytes` and copy them in.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::EmptyEncoding`] if `bytes` is empty.
    /// - [`ProbeError::BufferTooLarge`] if the length does not fit an `i32`.
    /// - [`ProbeError::AllocationFailed`] if the allocator returns null.
    pub fn copy_from_slice(bytes: &[u8]) -> Result<Self, ProbeError> {
        if bytes.is_empty() {
            return Err(ProbeError::EmptyEncoding);
        }
        if i32::try_from(bytes.len()).is_err() {
            return Err(ProbeError::BufferTooLarge(bytes.len()));
        }

        let layout = layout_for(bytes.len())?;
        unsafe {
            let base = alloc::alloc(layout);
            if base.is_null() {
                return Err(ProbeError::AllocationFailed(layout.size()));
            }
            ptr::write(base as *mut usize, bytes.len());
            let payload = base.add(HEADER_SIZE);
            ptr::copy_nonoverlapping(bytes.as_ptr(), payload, bytes.len());
            Ok(Self {
                payload: NonNull::new_unchecked(payload),
                length: bytes.len(),
            })
        }
    }

    /// Number of payload bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always `false`; empty buffers cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Borrow the payload.
    pub fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.payload.as_ptr(), self.length) }
    }

    /// Give up ownership, returning the payload pointer and its length.
    ///
    /// The memory must eventually be passed to [`FrameBuffer::release`].
    pub fn into_raw(self) -> (*mut u8, usize) {
        let parts = (self.payload.as_ptr(), self.length);
        mem::forget(self);
        parts
    }

    /// Free a pointer previously returned by [`FrameBuffer::into_raw`].
    ///
    /// A null pointer is ignored.
    ///
    /// # Safety
    ///
    /// `payload` must be null or a pointer obtained from
    /// [`FrameBuffer::into_raw`] that has not been released yet.
    pub unsafe fn release(payload: *mut u8) {
        if payload.is_null() {
            return;
        }
        unsafe {
            let base = payload.sub(HEADER_SIZE);
            let length = ptr::read(base as *const usize);
            // The layout was valid when the buffer was created.
            let layout = Layout::from_size_align_unchecked(HEADER_SIZE + length, ALIGNMENT);
            alloc::dealloc(base, layout);
        }
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        unsafe { Self::release(self.payload.as_ptr()) }
    }
}

fn layout_for(length: usize) -> Result<Layout, ProbeError> {
    HEADER_SIZE
        .checked_add(length)
        .and_then(|size| Layout::from_size_align(size, ALIGNMENT).ok())
        .ok_or(ProbeError::BufferTooLarge(length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_bytes_exactly() {
        let buffer = FrameBuffer::copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.is_empty());
        assert_eq!(buffer.as_slice(), &[0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            FrameBuffer::copy_from_slice(&[]),
            Err(ProbeError::EmptyEncoding)
        ));
    }

    #[test]
    fn raw_round_trip_releases_memory() {
        let payload: Vec<u8> = (0..=255).collect();
        let buffer = FrameBuffer::copy_from_slice(&payload).unwrap();
        let (pointer, length) = buffer.into_raw();
        assert_eq!(length, 256);
        let view = unsafe { slice::from_raw_parts(pointer, length) };
        assert_eq!(view, payload.as_slice());
        unsafe { FrameBuffer::release(pointer) };
    }

    #[test]
    fn releasing_null_is_a_no_op() {
        unsafe { FrameBuffer::release(ptr::null_mut()) };
    }

    #[test]
    fn payload_is_word_aligned() {
        let buffer = FrameBuffer::copy_from_slice(b"abc").unwrap();
        assert_eq!(buffer.as_slice().as_ptr() as usize % ALIGNMENT, 0);
    }
}
