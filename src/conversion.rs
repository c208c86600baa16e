//! Decoded-frame to image conversion.

use ffmpeg_next::frame::Video as VideoFrame;
use image::{DynamicImage, RgbImage};

use crate::error::ProbeError;

const RGB24_BYTES_PER_PIXEL: usize = 3;

/// Copy an RGB24 frame into a [`DynamicImage`].
///
/// FFmpeg frames usually pad each row (stride > width × 3); the padding is
/// stripped so the buffer is tightly packed.
pub(crate) fn rgb_frame_to_image(rgb_frame: &VideoFrame) -> Result<DynamicImage, ProbeError> {
    let width = rgb_frame.width();
    let height = rgb_frame.height();
    let buffer = packed_plane(
        rgb_frame.data(0),
        rgb_frame.stride(0),
        width as usize * RGB24_BYTES_PER_PIXEL,
        height as usize,
    )?;

    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ProbeError::VideoDecodeError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}

/// Strip per-row padding from a plane of `rows` rows of `row_bytes` bytes.
fn packed_plane(
    data: &[u8],
    stride: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<Vec<u8>, ProbeError> {
    let required = if rows == 0 {
        0
    } else {
        stride * (rows - 1) + row_bytes
    };
    if stride < row_bytes || data.len() < required {
        return Err(ProbeError::VideoDecodeError(format!(
            "Frame plane too small: {} bytes, stride {stride}, {rows} rows of {row_bytes}",
            data.len()
        )));
    }

    if stride == row_bytes {
        return Ok(data[..row_bytes * rows].to_vec());
    }

    let mut buffer = Vec::with_capacity(row_bytes * rows);
    for row in 0..rows {
        let start = row * stride;
        buffer.extend_from_slice(&data[start..start + row_bytes]);
    }
    Ok(buffer)
}
