//! Frame-index to timestamp mapping.
//!
//! A container has no frame numbers; frame `N` is defined as the picture on
//! screen at `N / nominal_frame_rate` seconds. The conversion is done in
//! exact rational arithmetic straight into the stream's own time base, so
//! there is no intermediate timescale to round through and a high frame
//! index cannot drift onto its neighbour (e.g. 29.97 fps with a 1/30000 time
//! base maps every frame onto an exact tick).

use ffmpeg_next::Rational;

use crate::error::ProbeError;

/// Microsecond time base used by container-level seeking (`AV_TIME_BASE`).
const SEEK_TICKS_PER_SECOND: i128 = 1_000_000;

/// The timestamp a frame index addresses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTimestamp {
    frame_index: i32,
    ticks: i64,
    seconds: f64,
}

impl FrameTimestamp {
    /// Map `frame_index` onto the stream time base.
    ///
    /// The result is relative to the stream's first frame. Frame 0 is always
    /// tick 0 and timestamps increase strictly with the index.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::NegativeFrameIndex`] for indices below zero.
    /// - [`ProbeError::InvalidFrameRate`] if the frame rate is not positive.
    /// - [`ProbeError::VideoDecodeError`] if the time base is not positive.
    pub fn for_frame(
        frame_index: i32,
        frame_rate: Rational,
        time_base: Rational,
    ) -> Result<Self, ProbeError> {
        if frame_index < 0 {
            return Err(ProbeError::NegativeFrameIndex(frame_index));
        }
        check_frame_rate(frame_rate)?;
        check_time_base(time_base)?;

        let numerator = frame_index as i128
            * frame_rate.denominator() as i128
            * time_base.denominator() as i128;
        let denominator = frame_rate.numerator() as i128 * time_base.numerator() as i128;
        let ticks = i64::try_from(divide_rounded(numerator, denominator)).map_err(|_| {
            ProbeError::VideoDecodeError(format!(
                "Timestamp for frame {frame_index} overflows the stream time base"
            ))
        })?;

        let seconds = if frame_index == 0 {
            0.0
        } else {
            frame_index as f64 * frame_rate.denominator() as f64 / frame_rate.numerator() as f64
        };

        Ok(Self {
            frame_index,
            ticks,
            seconds,
        })
    }

    /// The frame index this timestamp was derived from.
    pub fn frame_index(&self) -> i32 {
        self.frame_index
    }

    /// Offset from the first frame, in stream time-base ticks.
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Offset from the first frame, in seconds.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

/// Length of one nominal frame in stream ticks, at least one tick.
pub(crate) fn frame_duration_ticks(frame_rate: Rational, time_base: Rational) -> i64 {
    let numerator = frame_rate.denominator() as i128 * time_base.denominator() as i128;
    let denominator = frame_rate.numerator() as i128 * time_base.numerator() as i128;
    if denominator <= 0 || numerator <= 0 {
        return 1;
    }
    i64::try_from(divide_rounded(numerator, denominator))
        .unwrap_or(i64::MAX)
        .max(1)
}

/// Convert an absolute stream timestamp to the microsecond base used for
/// container seeking, rounding down so the seek never lands past it.
pub(crate) fn stream_ticks_to_seek_timestamp(ticks: i64, time_base: Rational) -> i64 {
    if time_base.denominator() <= 0 {
        return 0;
    }
    let micros = (ticks as i128 * time_base.numerator() as i128 * SEEK_TICKS_PER_SECOND)
        .div_euclid(time_base.denominator() as i128);
    micros.clamp(i64::MIN as i128 + 1, i64::MAX as i128) as i64
}

fn check_frame_rate(frame_rate: Rational) -> Result<(), ProbeError> {
    if frame_rate.numerator() <= 0 || frame_rate.denominator() <= 0 {
        let fps = if frame_rate.denominator() == 0 {
            0.0
        } else {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        };
        return Err(ProbeError::InvalidFrameRate(fps));
    }
    Ok(())
}

fn check_time_base(time_base: Rational) -> Result<(), ProbeError> {
    if time_base.numerator() <= 0 || time_base.denominator() <= 0 {
        return Err(ProbeError::VideoDecodeError(format!(
            "Invalid stream time base {}/{}",
            time_base.numerator(),
            time_base.denominator()
        )));
    }
    Ok(())
}

/// Round-half-up division of non-negative values.
fn divide_rounded(numerator: i128, denominator: i128) -> i128 {
    (2 * numerator + denominator) / (2 * denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4_time_base() -> Rational {
        Rational::new(1, 15360)
    }

    #[test]
    fn frame_zero_is_exactly_zero() {
        let timestamp =
            FrameTimestamp::for_frame(0, Rational::new(30, 1), mp4_time_base()).unwrap();
        assert_eq!(timestamp.ticks(), 0);
        assert_eq!(timestamp.seconds(), 0.0);
    }

    #[test]
    fn mid_video_frame_at_thirty_fps() {
        let timestamp =
            FrameTimestamp::for_frame(150, Rational::new(30, 1), mp4_time_base()).unwrap();
        assert_eq!(timestamp.seconds(), 5.0);
        assert_eq!(timestamp.ticks(), 5 * 15360);
    }

    #[test]
    fn ntsc_rate_maps_onto_exact_ticks() {
        let rate = Rational::new(30000, 1001);
        let time_base = Rational::new(1, 30000);
        for index in [1, 1_000, 100_000, 2_000_000] {
            let timestamp = FrameTimestamp::for_frame(index, rate, time_base).unwrap();
            assert_eq!(timestamp.ticks(), index as i64 * 1001);
        }
    }

    #[test]
    fn timestamps_increase_with_index() {
        let rate = Rational::new(24000, 1001);
        let time_base = Rational::new(1, 90000);
        let mut previous = FrameTimestamp::for_frame(0, rate, time_base).unwrap();
        for index in 1..2_000 {
            let current = FrameTimestamp::for_frame(index, rate, time_base).unwrap();
            assert!(current.ticks() > previous.ticks());
            assert!(current.seconds() > previous.seconds());
            previous = current;
        }
    }

    #[test]
    fn negative_index_is_rejected() {
        let result = FrameTimestamp::for_frame(-1, Rational::new(30, 1), mp4_time_base());
        assert!(matches!(result, Err(ProbeError::NegativeFrameIndex(-1))));
    }

    #[test]
    fn non_positive_frame_rate_is_rejected() {
        let result = FrameTimestamp::for_frame(3, Rational::new(0, 1), mp4_time_base());
        assert!(matches!(result, Err(ProbeError::InvalidFrameRate(_))));
        let result = FrameTimestamp::for_frame(3, Rational::new(30, 0), mp4_time_base());
        assert!(matches!(result, Err(ProbeError::InvalidFrameRate(_))));
    }

    #[test]
    fn frame_duration_in_ticks() {
        assert_eq!(frame_duration_ticks(Rational::new(30, 1), mp4_time_base()), 512);
        assert_eq!(
            frame_duration_ticks(Rational::new(30000, 1001), Rational::new(1, 30000)),
            1001
        );
        assert_eq!(frame_duration_ticks(Rational::new(0, 1), mp4_time_base()), 1);
    }

    #[test]
    fn seek_timestamp_rounds_down_to_microseconds() {
        assert_eq!(stream_ticks_to_seek_timestamp(15360, mp4_time_base()), 1_000_000);
        assert_eq!(stream_ticks_to_seek_timestamp(1, Rational::new(1, 3)), 333_333);
        assert_eq!(stream_ticks_to_seek_timestamp(0, mp4_time_base()), 0);
    }
}
