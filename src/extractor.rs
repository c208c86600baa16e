//! Single-frame extraction.
//!
//! A frame index is mapped to a timestamp ([`FrameTimestamp`]), the demuxer
//! seeks to the keyframe at or before it, and frames are decoded forward
//! until the picture on screen at exactly that timestamp is known: the last
//! frame whose presentation time is not after the target. There is no
//! tolerance window; a cheaper nearby keyframe is never substituted.

use std::path::Path;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::DynamicImage;

use crate::{
    buffer::FrameBuffer,
    configuration::ExtractOptions,
    container::MediaHandle,
    conversion::rgb_frame_to_image,
    encode::encode_jpeg,
    error::ProbeError,
    metadata::ContainerDuration,
    timing::{FrameTimestamp, frame_duration_ticks, stream_ticks_to_seek_timestamp},
};

/// Decode the frame displayed at `frame_index` from an opened handle.
///
/// The returned image is RGB8 at the track's coded size, rotated/mirrored
/// into playback orientation when `options` asks for it.
///
/// # Errors
///
/// - [`ProbeError::NoVideoStream`] if the file has no video.
/// - [`ProbeError::InvalidFrameRate`] if the nominal frame rate is not positive.
/// - [`ProbeError::NegativeFrameIndex`] for negative indices.
/// - [`ProbeError::TimestampOutOfRange`] if the timestamp is at or past the
///   container duration.
/// - [`ProbeError::FrameNotFound`] if no decoded frame covers the timestamp.
/// - [`ProbeError::FfmpegError`] / [`ProbeError::VideoDecodeError`] when
///   seeking, decoding, or conversion fails.
///
/// # Example
///
/// ```no_run
/// use video_probe::{ExtractOptions, MediaHandle, extract_frame_image};
///
/// let mut handle = MediaHandle::open("input.mp4")?;
/// let image = extract_frame_image(&mut handle, 150, &ExtractOptions::default())?;
/// image.save("frame_150.png")?;
/// # Ok::<(), video_probe::ProbeError>(())
/// ```
pub fn extract_frame_image(
    handle: &mut MediaHandle,
    frame_index: i32,
    options: &ExtractOptions,
) -> Result<DynamicImage, ProbeError> {
    let video = handle.video_track()?.clone();

    if !(video.frames_per_second > 0.0) {
        return Err(ProbeError::InvalidFrameRate(video.frames_per_second));
    }

    let timestamp = FrameTimestamp::for_frame(frame_index, video.frame_rate, video.time_base)?;

    if let ContainerDuration::Known(duration_seconds) = handle.duration() {
        if duration_seconds > 0.0 && timestamp.seconds() >= duration_seconds {
            return Err(ProbeError::TimestampOutOfRange {
                frame_index,
                timestamp_seconds: timestamp.seconds(),
                duration_seconds,
            });
        }
    }

    let target_pts = video
        .start_time
        .checked_add(timestamp.ticks())
        .ok_or_else(|| {
            ProbeError::VideoDecodeError(format!(
                "Timestamp for frame {frame_index} overflows the stream time base"
            ))
        })?;

    log::debug!(
        "Extracting frame {} at {:.6}s (pts {} in {}/{})",
        frame_index,
        timestamp.seconds(),
        target_pts,
        video.time_base.numerator(),
        video.time_base.denominator(),
    );

    let stream = handle
        .input_context
        .stream(video.stream_index)
        .ok_or(ProbeError::NoVideoStream)?;
    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().video()?;

    let mut scaler = ScalingContext::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        ScalingFlags::BILINEAR,
    )?;

    // Frame 0 seeks too: a reused handle may already be past it. Its open
    // range lets the first keyframe qualify after microsecond rounding.
    let seek_timestamp = stream_ticks_to_seek_timestamp(target_pts, video.time_base);
    let seek_result = if frame_index == 0 {
        handle.input_context.seek(seek_timestamp, ..)
    } else {
        handle.input_context.seek(seek_timestamp, ..seek_timestamp)
    };
    seek_result.map_err(|error| {
        ProbeError::VideoDecodeError(format!(
            "Seek to {:.3}s failed: {error}",
            timestamp.seconds()
        ))
    })?;

    let mut locator = FrameLocator::new(target_pts, frame_index == 0);
    let mut decoded_frame = VideoFrame::empty();

    'packets: for (stream, packet) in handle.input_context.packets() {
        if stream.index() != video.stream_index {
            continue;
        }

        decoder.send_packet(&packet)?;

        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if locator.offer(&mut decoded_frame) == Search::Done {
                break 'packets;
            }
        }
    }

    if !locator.is_done() {
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if locator.offer(&mut decoded_frame) == Search::Done {
                break;
            }
        }
    }

    let frame_ticks = frame_duration_ticks(video.frame_rate, video.time_base);
    let located = locator.finish(frame_ticks).ok_or(ProbeError::FrameNotFound {
        frame_index,
        timestamp_seconds: timestamp.seconds(),
    })?;

    let mut rgb_frame = VideoFrame::empty();
    scaler.run(located, &mut rgb_frame)?;
    let image = rgb_frame_to_image(&rgb_frame)?;

    if options.applies_display_transform() {
        Ok(video.display_transform.apply(image))
    } else {
        Ok(image)
    }
}

/// Open `path`, decode the frame at `frame_index`, and encode it as JPEG.
///
/// The media handle and all decoder resources are released before this
/// returns.
///
/// # Example
///
/// ```no_run
/// use video_probe::{ExtractOptions, extract_frame_jpeg};
///
/// let jpeg = extract_frame_jpeg("input.mp4", 0, &ExtractOptions::default())?;
/// std::fs::write("first_frame.jpg", &jpeg).unwrap();
/// # Ok::<(), video_probe::ProbeError>(())
/// ```
pub fn extract_frame_jpeg<P: AsRef<Path>>(
    path: P,
    frame_index: i32,
    options: &ExtractOptions,
) -> Result<Vec<u8>, ProbeError> {
    let image = {
        let mut handle = MediaHandle::open(path)?;
        extract_frame_image(&mut handle, frame_index, options)?
    };
    encode_jpeg(&image, options.jpeg_quality())
}

/// Like [`extract_frame_jpeg`], but returns the bytes in a [`FrameBuffer`]
/// ready to be handed across the C boundary.
pub fn extract_frame_buffer<P: AsRef<Path>>(
    path: P,
    frame_index: i32,
    options: &ExtractOptions,
) -> Result<FrameBuffer, ProbeError> {
    let jpeg = extract_frame_jpeg(path, frame_index, options)?;
    FrameBuffer::copy_from_slice(&jpeg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Continue,
    Done,
}

/// Tracks the frame on screen at `target_pts` as frames arrive in
/// presentation order.
struct FrameLocator {
    target_pts: i64,
    /// Frame 0 accepts the first decoded frame even if its timestamp is
    /// slightly after the stream start (e.g. B-frame reordering offsets).
    accept_first_frame: bool,
    candidate: VideoFrame,
    candidate_pts: Option<i64>,
    /// A frame after the target was seen, so the candidate is final.
    done: bool,
}

impl FrameLocator {
    fn new(target_pts: i64, accept_first_frame: bool) -> Self {
        Self {
            target_pts,
            accept_first_frame,
            candidate: VideoFrame::empty(),
            candidate_pts: None,
            done: false,
        }
    }

    fn offer(&mut self, frame: &mut VideoFrame) -> Search {
        let Some(pts) = frame.timestamp().or_else(|| frame.pts()) else {
            return Search::Continue;
        };

        if pts <= self.target_pts {
            std::mem::swap(&mut self.candidate, frame);
            self.candidate_pts = Some(pts);
            return Search::Continue;
        }

        if self.candidate_pts.is_none() && self.accept_first_frame {
            std::mem::swap(&mut self.candidate, frame);
            self.candidate_pts = Some(pts);
        }
        self.done = true;
        Search::Done
    }

    fn is_done(&self) -> bool {
        self.done
    }

    /// The located frame, if any.
    ///
    /// At end of stream the last frame only counts while the target still
    /// falls inside its nominal display interval.
    fn finish(&self, frame_ticks: i64) -> Option<&VideoFrame> {
        let pts = self.candidate_pts?;
        if self.done || self.target_pts < pts.saturating_add(frame_ticks) {
            Some(&self.candidate)
        } else {
            log::debug!(
                "Target pts {} lies past the last decoded frame at pts {}",
                self.target_pts,
                pts
            );
            None
        }
    }
}
