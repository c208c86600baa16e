//! Container and track metadata.
//!
//! These values are read once by [`MediaHandle::open`](crate::MediaHandle::open)
//! and live only as long as the handle that produced them.

use ffmpeg_next::Rational;

use crate::orientation::DisplayTransform;

/// FFmpeg expresses container durations in `AV_TIME_BASE` units (microseconds).
const CONTAINER_TICKS_PER_SECOND: f64 = 1_000_000.0;

/// FFmpeg's `AV_NOPTS_VALUE`: "no timestamp / unknown".
pub(crate) const NO_TIMESTAMP: i64 = i64::MIN;

/// Duration reported by a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContainerDuration {
    /// A finite, non-negative duration in seconds.
    Known(f64),
    /// The container reports no duration, or an indefinite/negative one.
    Unknown,
}

impl ContainerDuration {
    /// Interpret a raw container duration in `AV_TIME_BASE` units.
    pub(crate) fn from_container_ticks(ticks: i64) -> Self {
        if ticks == NO_TIMESTAMP || ticks < 0 {
            return ContainerDuration::Unknown;
        }
        let seconds = ticks as f64 / CONTAINER_TICKS_PER_SECOND;
        if seconds.is_finite() {
            ContainerDuration::Known(seconds)
        } else {
            ContainerDuration::Unknown
        }
    }

    /// The duration in seconds, if known.
    pub fn seconds(self) -> Option<f64> {
        match self {
            ContainerDuration::Known(seconds) => Some(seconds),
            ContainerDuration::Unknown => None,
        }
    }
}

/// Descriptor of the primary video track.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoTrackInfo {
    /// Index of the stream inside the container.
    pub stream_index: usize,
    /// Coded frame width in pixels.
    pub width: u32,
    /// Coded frame height in pixels.
    pub height: u32,
    /// Nominal frame rate as declared by the track.
    pub frame_rate: Rational,
    /// Nominal frame rate in frames per second (approximate for VFR content).
    pub frames_per_second: f64,
    /// Time base of the stream's timestamps.
    pub time_base: Rational,
    /// Presentation timestamp of the first frame, in `time_base` ticks.
    pub start_time: i64,
    /// Codec name (e.g. `"h264"`).
    pub codec: String,
    /// Rotation/mirroring needed to match playback orientation.
    pub display_transform: DisplayTransform,
}

impl VideoTrackInfo {
    /// Frame dimensions after the display transform is applied.
    pub fn display_dimensions(&self) -> (u32, u32) {
        if self.display_transform.swaps_dimensions() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// Pick the nominal frame rate: the average rate, else the real base rate.
pub(crate) fn nominal_frame_rate(average: Rational, base: Rational) -> Rational {
    if average.numerator() > 0 && average.denominator() > 0 {
        average
    } else {
        base
    }
}

/// Frames per second for a rational rate, or `0.0` when the rate is unset.
pub(crate) fn rational_to_fps(rate: Rational) -> f64 {
    if rate.denominator() == 0 {
        0.0
    } else {
        rate.numerator() as f64 / rate.denominator() as f64
    }
}
