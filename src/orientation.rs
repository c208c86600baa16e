//! Playback orientation of a video track.
//!
//! Phones record in sensor orientation and store a display matrix telling
//! players how to rotate or mirror the picture. [`DisplayTransform`] reduces
//! that matrix to one of the eight right-angle orientations and applies it
//! to a decoded [`DynamicImage`], so extracted frames look the way the video
//! plays back.

use ffmpeg_next::format::stream::Stream;
use ffmpeg_sys_next::{AVPacketSideDataType, av_packet_side_data_get};
use image::DynamicImage;

/// Display matrix entries are 16.16 fixed point (the last column is 2.30).
const FIXED_POINT_ONE: f64 = 65536.0;

/// A rotation and/or mirror needed to show a frame in playback orientation.
///
/// Rotations are clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayTransform {
    /// Frames are stored upright.
    #[default]
    Identity,
    /// Rotate 90° clockwise.
    Rotate90,
    /// Rotate 180°.
    Rotate180,
    /// Rotate 270° clockwise (90° counter-clockwise).
    Rotate270,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
    /// Rotate 90° counter-clockwise, then mirror top to bottom.
    Transpose,
    /// Rotate 90° clockwise, then mirror top to bottom.
    Transverse,
}

impl DisplayTransform {
    /// Reduce a 3×3 display matrix to a right-angle transform.
    ///
    /// Non-right-angle rotations cannot be applied without resampling and
    /// yield [`DisplayTransform::Identity`].
    pub fn from_display_matrix(matrix: &[i32; 9]) -> Self {
        let entry = |index: usize| matrix[index] as f64 / FIXED_POINT_ONE;

        let scale_x = entry(0).hypot(entry(3));
        let scale_y = entry(1).hypot(entry(4));
        if scale_x == 0.0 || scale_y == 0.0 {
            log::warn!("Ignoring degenerate display matrix {matrix:?}");
            return DisplayTransform::Identity;
        }

        let mut theta = (entry(1) / scale_y)
            .atan2(entry(0) / scale_x)
            .to_degrees()
            .round();
        theta -= 360.0 * (theta / 360.0 + 0.9 / 360.0).floor();

        if (theta - 90.0).abs() < 1.0 {
            if matrix[3] > 0 {
                DisplayTransform::Transpose
            } else {
                DisplayTransform::Rotate90
            }
        } else if (theta - 180.0).abs() < 1.0 {
            match (matrix[0] < 0, matrix[4] < 0) {
                (true, true) => DisplayTransform::Rotate180,
                (true, false) => DisplayTransform::FlipHorizontal,
                (false, true) => DisplayTransform::FlipVertical,
                (false, false) => DisplayTransform::Identity,
            }
        } else if (theta - 270.0).abs() < 1.0 {
            if matrix[3] < 0 {
                DisplayTransform::Transverse
            } else {
                DisplayTransform::Rotate270
            }
        } else if theta.abs() > 1.0 {
            log::warn!("Ignoring non-right-angle display rotation of {theta}°");
            DisplayTransform::Identity
        } else if matrix[4] < 0 {
            DisplayTransform::FlipVertical
        } else {
            DisplayTransform::Identity
        }
    }

    /// Interpret a legacy `rotate` stream tag (clockwise degrees).
    pub fn from_rotate_tag(value: &str) -> Option<Self> {
        let degrees: i64 = value.trim().parse().ok()?;
        match degrees.rem_euclid(360) {
            0 => Some(DisplayTransform::Identity),
            90 => Some(DisplayTransform::Rotate90),
            180 => Some(DisplayTransform::Rotate180),
            270 => Some(DisplayTransform::Rotate270),
            _ => None,
        }
    }

    /// Whether the transform exchanges width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            DisplayTransform::Rotate90
                | DisplayTransform::Rotate270
                | DisplayTransform::Transpose
                | DisplayTransform::Transverse
        )
    }

    /// Apply the transform to a decoded frame.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            DisplayTransform::Identity => image,
            DisplayTransform::Rotate90 => image.rotate90(),
            DisplayTransform::Rotate180 => image.rotate180(),
            DisplayTransform::Rotate270 => image.rotate270(),
            DisplayTransform::FlipHorizontal => image.fliph(),
            DisplayTransform::FlipVertical => image.flipv(),
            DisplayTransform::Transpose => image.rotate270().flipv(),
            DisplayTransform::Transverse => image.rotate90().flipv(),
        }
    }
}

/// Read the display transform of a stream.
///
/// Prefers the display matrix in the codec parameters' side data and falls
/// back to the `rotate` tag written by older muxers.
pub(crate) fn read_display_transform(stream: &Stream<'_>) -> DisplayTransform {
    if let Some(matrix) = display_matrix(stream) {
        return DisplayTransform::from_display_matrix(&matrix);
    }

    stream
        .metadata()
        .get("rotate")
        .and_then(DisplayTransform::from_rotate_tag)
        .unwrap_or_default()
}

fn display_matrix(stream: &Stream<'_>) -> Option<[i32; 9]> {
    let parameters = stream.parameters();
    unsafe {
        let raw_parameters = parameters.as_ptr();
        let side_data = av_packet_side_data_get(
            (*raw_parameters).coded_side_data,
            (*raw_parameters).nb_coded_side_data,
            AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX,
        );
        if side_data.is_null()
            || (*side_data).data.is_null()
            || (*side_data).size < std::mem::size_of::<[i32; 9]>()
        {
            return None;
        }
        Some(std::ptr::read_unaligned((*side_data).data as *const [i32; 9]))
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    /// Same layout FFmpeg's `av_display_rotation_set` produces.
    fn rotation_matrix(clockwise_degrees: f64) -> [i32; 9] {
        let radians = -clockwise_degrees.to_radians();
        let (sin, cos) = radians.sin_cos();
        let fixed = |value: f64| (value * FIXED_POINT_ONE).round() as i32;
        [
            fixed(cos),
            fixed(-sin),
            0,
            fixed(sin),
            fixed(cos),
            0,
            0,
            0,
            1 << 30,
        ]
    }

    fn flip_columns(mut matrix: [i32; 9], horizontal: bool, vertical: bool) -> [i32; 9] {
        let flip = [
            if horizontal { -1 } else { 1 },
            if vertical { -1 } else { 1 },
            1,
        ];
        for (index, value) in matrix.iter_mut().enumerate() {
            *value *= flip[index % 3];
        }
        matrix
    }

    #[test]
    fn right_angle_rotations() {
        assert_eq!(
            DisplayTransform::from_display_matrix(&rotation_matrix(0.0)),
            DisplayTransform::Identity
        );
        assert_eq!(
            DisplayTransform::from_display_matrix(&rotation_matrix(90.0)),
            DisplayTransform::Rotate90
        );
        assert_eq!(
            DisplayTransform::from_display_matrix(&rotation_matrix(180.0)),
            DisplayTransform::Rotate180
        );
        assert_eq!(
            DisplayTransform::from_display_matrix(&rotation_matrix(270.0)),
            DisplayTransform::Rotate270
        );
        assert_eq!(
            DisplayTransform::from_display_matrix(&rotation_matrix(-90.0)),
            DisplayTransform::Rotate270
        );
    }

    #[test]
    fn mirrored_matrices() {
        let identity = rotation_matrix(0.0);
        assert_eq!(
            DisplayTransform::from_display_matrix(&flip_columns(identity, true, false)),
            DisplayTransform::FlipHorizontal
        );
        assert_eq!(
            DisplayTransform::from_display_matrix(&flip_columns(identity, false, true)),
            DisplayTransform::FlipVertical
        );
    }

    #[test]
    fn odd_angles_and_degenerate_matrices_are_ignored() {
        assert_eq!(
            DisplayTransform::from_display_matrix(&rotation_matrix(45.0)),
            DisplayTransform::Identity
        );
        assert_eq!(
            DisplayTransform::from_display_matrix(&[0; 9]),
            DisplayTransform::Identity
        );
    }

    #[test]
    fn rotate_tag() {
        assert_eq!(
            DisplayTransform::from_rotate_tag("90"),
            Some(DisplayTransform::Rotate90)
        );
        assert_eq!(
            DisplayTransform::from_rotate_tag("-90"),
            Some(DisplayTransform::Rotate270)
        );
        assert_eq!(DisplayTransform::from_rotate_tag("45"), None);
        assert_eq!(DisplayTransform::from_rotate_tag("sideways"), None);
    }

    #[test]
    fn rotation_moves_pixels_clockwise() {
        // 2×1 image: red on the left, blue on the right.
        let mut source = RgbImage::new(2, 1);
        source.put_pixel(0, 0, Rgb([255, 0, 0]));
        source.put_pixel(1, 0, Rgb([0, 0, 255]));

        let rotated = DisplayTransform::Rotate90
            .apply(DynamicImage::ImageRgb8(source))
            .to_rgb8();

        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(rotated.get_pixel(0, 1), &Rgb([0, 0, 255]));
    }

    #[test]
    fn dimension_swaps() {
        assert!(DisplayTransform::Rotate90.swaps_dimensions());
        assert!(DisplayTransform::Transverse.swaps_dimensions());
        assert!(!DisplayTransform::Rotate180.swaps_dimensions());
        assert!(!DisplayTransform::FlipHorizontal.swaps_dimensions());
    }
}
