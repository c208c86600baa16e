//! Error types for the `video-probe` crate.
//!
//! [`ProbeError`] is returned by every fallible operation in the Rust API.
//! The C exports in [`crate::ffi`] collapse it into a per-operation sentinel
//! (`-1.0`, `-1`, or a null pointer) after logging it.

use std::path::PathBuf;

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `video-probe` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The path was null, empty, or not representable on this platform.
    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    /// The media file could not be opened or parsed.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaHandle::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The container reports no usable duration.
    #[error("Container duration is unknown")]
    UnknownDuration,

    /// The video track declares a non-positive frame rate.
    #[error("Invalid nominal frame rate: {0}")]
    InvalidFrameRate(f64),

    /// A negative frame index was requested.
    #[error("Frame index {0} is negative")]
    NegativeFrameIndex(i32),

    /// The timestamp for the requested frame lies at or past the end of the media.
    #[error(
        "Frame {frame_index} maps to {timestamp_seconds:.3}s, beyond the media duration of {duration_seconds:.3}s"
    )]
    TimestampOutOfRange {
        /// The requested frame index.
        frame_index: i32,
        /// Timestamp derived from the frame index.
        timestamp_seconds: f64,
        /// Duration reported by the container.
        duration_seconds: f64,
    },

    /// No decoded frame is displayed at the requested timestamp.
    #[error("No decoded frame covers frame {frame_index} ({timestamp_seconds:.3}s)")]
    FrameNotFound {
        /// The requested frame index.
        frame_index: i32,
        /// Timestamp derived from the frame index.
        timestamp_seconds: f64,
    },

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The decoded frame could not be encoded as JPEG.
    #[error("Failed to encode JPEG: {0}")]
    JpegEncodeError(String),

    /// The JPEG encoder produced no data.
    #[error("JPEG encoder produced no data")]
    EmptyEncoding,

    /// The output buffer could not be allocated.
    #[error("Failed to allocate {0} bytes for the frame buffer")]
    AllocationFailed(usize),

    /// The encoded image does not fit the 32-bit size slot of the C API.
    #[error("Encoded frame of {0} bytes exceeds the maximum transferable size")]
    BufferTooLarge(usize),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An error from the `image` crate during conversion or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ProbeError {
    fn from(error: FfmpegError) -> Self {
        ProbeError::FfmpegError(error.to_string())
    }
}
