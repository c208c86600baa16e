//! Extraction options.
//!
//! [`ExtractOptions`] carries the tunables of frame extraction. The C
//! exports always use [`ExtractOptions::default`], which matches the fixed
//! behaviour of the foreign API: JPEG quality 90 and the track's display
//! transform applied.
//!
//! # Example
//!
//! ```no_run
//! use video_probe::{ExtractOptions, extract_frame_jpeg};
//!
//! let options = ExtractOptions::new()
//!     .with_jpeg_quality(75)
//!     .with_display_transform(false);
//! let jpeg = extract_frame_jpeg("input.mp4", 42, &options)?;
//! # Ok::<(), video_probe::ProbeError>(())
//! ```

/// JPEG quality used by the C exports (0.9 on a 0–1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Settings for single-frame extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ExtractOptions {
    /// JPEG quality on a 1–100 scale.
    pub(crate) jpeg_quality: u8,
    /// Whether to rotate/mirror the frame into its playback orientation.
    pub(crate) apply_display_transform: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    ///
    /// Defaults: quality [`DEFAULT_JPEG_QUALITY`], display transform applied.
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            apply_display_transform: true,
        }
    }

    /// Set the JPEG quality. Clamped to `1..=100`.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Control whether the track's rotation/mirroring metadata is applied.
    pub fn with_display_transform(mut self, apply: bool) -> Self {
        self.apply_display_transform = apply;
        self
    }

    /// The configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Whether the display transform will be applied.
    pub fn applies_display_transform(&self) -> bool {
        self.apply_display_transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_foreign_api() {
        let options = ExtractOptions::default();
        assert_eq!(options.jpeg_quality(), 90);
        assert!(options.applies_display_transform());
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(ExtractOptions::new().with_jpeg_quality(0).jpeg_quality(), 1);
        assert_eq!(
            ExtractOptions::new().with_jpeg_quality(250).jpeg_quality(),
            100
        );
    }
}
