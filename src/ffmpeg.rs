//! FFmpeg library setup.
//!
//! [`initialize`] registers FFmpeg's formats and codecs; it is called by
//! [`MediaHandle::open`](crate::MediaHandle::open) and is safe to call any
//! number of times from any thread.
//!
//! FFmpeg also prints its own warnings to stderr, separately from the Rust
//! [`log`] facade. A host embedding the C exports usually wants that quiet:
//!
//! ```no_run
//! use video_probe::FfmpegLogLevel;
//!
//! video_probe::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let level: FfmpegLogLevel = "quiet".parse().unwrap();
//! video_probe::set_ffmpeg_log_level(level);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;
use thiserror::Error;

use crate::error::ProbeError;

/// Initialise the FFmpeg libraries.
pub(crate) fn initialize() -> Result<(), ProbeError> {
    ffmpeg_next::init().map_err(ProbeError::from)
}

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

/// Returned when a string does not name an [`FfmpegLogLevel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown FFmpeg log level '{0}' (expected quiet, fatal, error, warning, info, debug)")]
pub struct UnknownLogLevel(pub String);

impl FromStr for FfmpegLogLevel {
    type Err = UnknownLogLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(FfmpegLogLevel::Quiet),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "debug" => Ok(FfmpegLogLevel::Debug),
            _ => Err(UnknownLogLevel(value.to_string())),
        }
    }
}

/// Set FFmpeg's internal log level.
///
/// This does not affect messages emitted through the `log` crate.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
