//! Container loading.
//!
//! [`MediaHandle`] owns an opened FFmpeg demuxer plus the metadata of the
//! primary video track. Every public operation opens its own handle and
//! drops it before returning; dropping the handle closes the demuxer, so the
//! release happens on every exit path, including `?` early returns.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{context::Input, stream::Disposition},
    media::Type,
};

use crate::{
    error::ProbeError,
    metadata::{
        ContainerDuration, NO_TIMESTAMP, VideoTrackInfo, nominal_frame_rate, rational_to_fps,
    },
    orientation::read_display_transform,
};
use url::Url;

const FILE_URI_PREFIX: &str = "file://";

/// An opened media container.
///
/// Exclusively owned by the call that opened it; it is neither `Clone` nor
/// shared between operations.
pub struct MediaHandle {
    pub(crate) input_context: Input,
    duration: ContainerDuration,
    video_track: Option<VideoTrackInfo>,
    path: PathBuf,
}

impl Debug for MediaHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaHandle")
            .field("path", &self.path)
            .field("duration", &self.duration)
            .field("video_track", &self.video_track)
            .finish_non_exhaustive()
    }
}

impl MediaHandle {
    /// Open a media file and read its duration and primary video track.
    ///
    /// `path` may be a filesystem path or a `file://` URI. A file without a
    /// video track opens successfully; [`video_track`](MediaHandle::video_track)
    /// then reports [`ProbeError::NoVideoStream`].
    ///
    /// # Errors
    ///
    /// - [`ProbeError::InvalidPath`] if the path is empty.
    /// - [`ProbeError::FileOpen`] if the file is missing or cannot be parsed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use video_probe::MediaHandle;
    ///
    /// let handle = MediaHandle::open("input.mp4")?;
    /// println!("{:?}", handle.duration());
    /// # Ok::<(), video_probe::ProbeError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProbeError> {
        let path = resolve_media_path(path.as_ref())?;

        log::debug!("Opening media file: {}", path.display());

        if !path.is_file() {
            return Err(ProbeError::FileOpen {
                path,
                reason: "file does not exist".to_string(),
            });
        }

        crate::ffmpeg::initialize().map_err(|error| ProbeError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ProbeError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let duration = ContainerDuration::from_container_ticks(input_context.duration());
        let video_track = read_primary_video_track(&input_context, &path)?;

        log::info!(
            "Opened media file: {} (format={}, duration={:?}, video={})",
            path.display(),
            input_context.format().name(),
            duration,
            video_track.is_some(),
        );

        if let Some(video) = &video_track {
            log::debug!(
                "Primary video stream: index={}, {}x{}, {:.3} fps, codec={}, transform={:?}",
                video.stream_index,
                video.width,
                video.height,
                video.frames_per_second,
                video.codec,
                video.display_transform,
            );
        }

        Ok(Self {
            input_context,
            duration,
            video_track,
            path,
        })
    }

    /// Duration reported by the container.
    pub fn duration(&self) -> ContainerDuration {
        self.duration
    }

    /// The primary video track.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NoVideoStream`] if the file has no video.
    pub fn video_track(&self) -> Result<&VideoTrackInfo, ProbeError> {
        self.video_track.as_ref().ok_or(ProbeError::NoVideoStream)
    }

    /// The resolved path of the opened file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The first video stream that is not embedded cover art.
fn read_primary_video_track(
    input_context: &Input,
    path: &Path,
) -> Result<Option<VideoTrackInfo>, ProbeError> {
    let Some(stream) = input_context.streams().find(|stream| {
        stream.parameters().medium() == Type::Video
            && !stream.disposition().contains(Disposition::ATTACHED_PIC)
    }) else {
        return Ok(None);
    };

    let index = stream.index();
    let decoder_context =
        CodecContext::from_parameters(stream.parameters()).map_err(|error| {
            ProbeError::FileOpen {
                path: path.to_path_buf(),
                reason: format!(
                    "Failed to read video codec parameters for stream {index}: {error}"
                ),
            }
        })?;
    let video_decoder = decoder_context
        .decoder()
        .video()
        .map_err(|error| ProbeError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("Failed to create video decoder for stream {index}: {error}"),
        })?;

    let frame_rate = nominal_frame_rate(stream.avg_frame_rate(), stream.rate());
    let start_time = match stream.start_time() {
        NO_TIMESTAMP => 0,
        start => start,
    };
    let codec = video_decoder
        .codec()
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(Some(VideoTrackInfo {
        stream_index: index,
        width: video_decoder.width(),
        height: video_decoder.height(),
        frame_rate,
        frames_per_second: rational_to_fps(frame_rate),
        time_base: stream.time_base(),
        start_time,
        codec,
        display_transform: read_display_transform(&stream),
    }))
}

/// Turn a caller-supplied path or `file://` URI into a filesystem path.
///
/// URIs naming a remote host are rejected rather than mapped onto a local
/// file.
pub(crate) fn resolve_media_path(raw: &Path) -> Result<PathBuf, ProbeError> {
    if raw.as_os_str().is_empty() {
        return Err(ProbeError::InvalidPath("path is empty".to_string()));
    }

    let Some(text) = raw.to_str().filter(|text| text.starts_with(FILE_URI_PREFIX)) else {
        return Ok(raw.to_path_buf());
    };

    let uri = Url::parse(text)
        .map_err(|error| ProbeError::InvalidPath(format!("malformed file URI {text}: {error}")))?;
    uri.to_file_path().map_err(|()| {
        ProbeError::InvalidPath(format!("file URI {text} does not name a local file"))
    })
}
