//! JPEG encoding of extracted frames.

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::error::ProbeError;

/// Encode `image` as a baseline JPEG at `quality` (1–100).
///
/// Images with an alpha channel or more than 8 bits per channel are
/// converted to RGB8 first, since JPEG carries neither.
///
/// # Errors
///
/// Returns [`ProbeError::JpegEncodeError`] if the encoder fails and
/// [`ProbeError::EmptyEncoding`] if it produces no bytes.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProbeError> {
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));

    let result = match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => {
            image.write_with_encoder(encoder)
        }
        other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder),
    };
    result.map_err(|error| ProbeError::JpegEncodeError(error.to_string()))?;

    if jpeg.is_empty() {
        return Err(ProbeError::EmptyEncoding);
    }

    log::trace!(
        "Encoded {}x{} frame as {} JPEG bytes (quality {})",
        image.width(),
        image.height(),
        jpeg.len(),
        quality
    );

    Ok(jpeg)
}
