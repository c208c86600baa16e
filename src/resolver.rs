//! Duration and frame-count resolution.
//!
//! Both values come from container metadata alone; nothing is decoded.

use std::path::Path;

use crate::{container::MediaHandle, error::ProbeError, metadata::ContainerDuration};

/// Duration of a media file in seconds.
///
/// # Errors
///
/// Returns [`ProbeError::UnknownDuration`] when the container reports an
/// indefinite or negative duration, or any error from
/// [`MediaHandle::open`].
///
/// # Example
///
/// ```no_run
/// let seconds = video_probe::duration_seconds("input.mp4")?;
/// println!("{seconds:.2}s");
/// # Ok::<(), video_probe::ProbeError>(())
/// ```
pub fn duration_seconds<P: AsRef<Path>>(path: P) -> Result<f64, ProbeError> {
    let handle = MediaHandle::open(path)?;
    handle
        .duration()
        .seconds()
        .ok_or(ProbeError::UnknownDuration)
}

/// Estimated number of frames in the primary video track.
///
/// Computed as `floor(duration * nominal_fps)`. For variable-frame-rate
/// sources this is an estimate and may differ from the number of frames a
/// decoder would actually produce.
///
/// # Errors
///
/// - [`ProbeError::NoVideoStream`] if the file has no video.
/// - [`ProbeError::UnknownDuration`] if the duration is unknown or zero.
/// - [`ProbeError::InvalidFrameRate`] if the frame rate is not positive.
pub fn frame_count<P: AsRef<Path>>(path: P) -> Result<i32, ProbeError> {
    let handle = MediaHandle::open(path)?;
    let video = handle.video_track()?;
    let duration = match handle.duration() {
        ContainerDuration::Known(seconds) => seconds,
        ContainerDuration::Unknown => return Err(ProbeError::UnknownDuration),
    };
    estimate_frame_count(duration, video.frames_per_second)
}

/// `floor(duration_seconds * frames_per_second)`, saturated to `i32`.
///
/// # Errors
///
/// Fails when either input is non-positive or not finite, so the result is
/// never positive for a degenerate track.
pub fn estimate_frame_count(
    duration_seconds: f64,
    frames_per_second: f64,
) -> Result<i32, ProbeError> {
    if !(frames_per_second.is_finite() && frames_per_second > 0.0) {
        return Err(ProbeError::InvalidFrameRate(frames_per_second));
    }
    if !(duration_seconds.is_finite() && duration_seconds > 0.0) {
        return Err(ProbeError::UnknownDuration);
    }
    Ok((duration_seconds * frames_per_second).floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_seconds_at_thirty_fps() {
        assert_eq!(estimate_frame_count(10.0, 30.0).unwrap(), 300);
    }

    #[test]
    fn fractional_results_are_floored() {
        assert_eq!(estimate_frame_count(10.0, 29.97).unwrap(), 299);
        assert_eq!(estimate_frame_count(0.01, 30.0).unwrap(), 0);
    }

    #[test]
    fn non_positive_inputs_fail() {
        assert!(matches!(
            estimate_frame_count(10.0, 0.0),
            Err(ProbeError::InvalidFrameRate(_))
        ));
        assert!(matches!(
            estimate_frame_count(0.0, 30.0),
            Err(ProbeError::UnknownDuration)
        ));
        assert!(estimate_frame_count(-3.0, 30.0).is_err());
        assert!(estimate_frame_count(10.0, f64::NAN).is_err());
    }

    #[test]
    fn huge_products_saturate() {
        assert_eq!(estimate_frame_count(1.0e12, 1000.0).unwrap(), i32::MAX);
    }
}
