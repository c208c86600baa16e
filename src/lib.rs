//! # video-probe
//!
//! Probe local video files: total duration, estimated frame count, and a
//! single decoded frame rendered as JPEG. Built on FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! The crate has two faces:
//!
//! - a Rust API returning `Result<_, ProbeError>`;
//! - four C exports in [`ffi`] (`get_duration`, `get_frame_count`,
//!   `extract_frame`, `free_frame`) that collapse errors into sentinels,
//!   for hosts that load the `cdylib`/`staticlib`.
//!
//! Every operation opens the file, does its work, and closes it again.
//! Nothing is cached between calls, so calls on different files are safe to
//! run concurrently.
//!
//! ## Quick Start
//!
//! ```no_run
//! use video_probe::{ExtractOptions, duration_seconds, extract_frame_jpeg, frame_count};
//!
//! let seconds = duration_seconds("input.mp4")?;
//! let frames = frame_count("input.mp4")?;
//! let jpeg = extract_frame_jpeg("input.mp4", frames / 2, &ExtractOptions::default())?;
//! println!("{seconds:.2}s, ~{frames} frames, middle frame is {} bytes", jpeg.len());
//! # Ok::<(), video_probe::ProbeError>(())
//! ```
//!
//! ## Frame addressing
//!
//! Frame `N` is the picture on screen at `N / nominal_fps` seconds after the
//! first frame. The frame count is `floor(duration * nominal_fps)`; for
//! variable-frame-rate content both are approximations.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the build machine.

pub mod buffer;
pub mod configuration;
pub mod container;
mod conversion;
pub mod encode;
pub mod error;
pub mod extractor;
pub mod ffi;
pub mod ffmpeg;
pub mod metadata;
pub mod orientation;
pub mod resolver;
pub mod timing;

pub use buffer::FrameBuffer;
pub use configuration::{DEFAULT_JPEG_QUALITY, ExtractOptions};
pub use container::MediaHandle;
pub use encode::encode_jpeg;
pub use error::ProbeError;
pub use extractor::{extract_frame_buffer, extract_frame_image, extract_frame_jpeg};
pub use ffmpeg::{FfmpegLogLevel, UnknownLogLevel, set_ffmpeg_log_level};
pub use metadata::{ContainerDuration, VideoTrackInfo};
pub use orientation::DisplayTransform;
pub use resolver::{duration_seconds, estimate_frame_count, frame_count};
pub use timing::FrameTimestamp;
