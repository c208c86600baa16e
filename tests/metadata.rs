//! Duration and frame-count integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and return early when they are missing.

use std::{ffi::CString, path::Path};

use video_probe::{
    ContainerDuration, DisplayTransform, MediaHandle, ProbeError, duration_seconds, ffi,
    frame_count,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn audio_only_path() -> &'static str {
    "tests/fixtures/sample_audio_only.m4a"
}

#[test]
fn duration_of_ten_second_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let seconds = duration_seconds(path).expect("duration");
    assert!((seconds - 10.0).abs() < 0.05, "expected ~10s, got {seconds}");
}

#[test]
fn frame_count_is_duration_times_rate() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    assert_eq!(frame_count(path).expect("frame count"), 300);

    let handle = MediaHandle::open(path).expect("open");
    let video = handle.video_track().expect("video track");
    let ContainerDuration::Known(seconds) = handle.duration() else {
        panic!("fixture should report a duration");
    };
    let expected = (seconds * video.frames_per_second).floor() as i32;
    assert_eq!(frame_count(path).unwrap(), expected);
}

#[test]
fn video_track_metadata() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let handle = MediaHandle::open(path).expect("open");
    let video = handle.video_track().expect("video track");
    assert_eq!((video.width, video.height), (320, 240));
    assert!((video.frames_per_second - 30.0).abs() < 1e-9);
    assert_eq!(video.codec, "h264");
    assert_eq!(video.display_transform, DisplayTransform::Identity);
}

#[test]
fn rotated_video_reports_transform() {
    let path = "tests/fixtures/sample_rotated.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let handle = MediaHandle::open(path).expect("open");
    let video = handle.video_track().expect("video track");
    assert!(video.display_transform.swaps_dimensions());
    assert_eq!(video.display_dimensions(), (240, 320));
}

#[test]
fn audio_only_file_has_no_frame_count() {
    let path = audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    assert!(duration_seconds(path).expect("duration") > 0.0);
    assert!(matches!(frame_count(path), Err(ProbeError::NoVideoStream)));

    let c_path = CString::new(path).unwrap();
    assert_eq!(unsafe { ffi::get_frame_count(c_path.as_ptr()) }, -1);
}

#[test]
fn ffi_matches_rust_api() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let c_path = CString::new(path).unwrap();
    let seconds = unsafe { ffi::get_duration(c_path.as_ptr()) };
    assert_eq!(seconds, duration_seconds(path).unwrap());
    assert_eq!(unsafe { ffi::get_frame_count(c_path.as_ptr()) }, 300);
}

#[test]
fn file_uri_is_accepted() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let absolute = std::fs::canonicalize(path).unwrap();
    let uri = format!("file://{}", absolute.display());
    assert_eq!(frame_count(&uri).expect("frame count via URI"), 300);
}

#[test]
fn garbage_file_fails_to_open() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = duration_seconds(&invalid_file_path);
    assert!(matches!(result, Err(ProbeError::FileOpen { .. })));

    let c_path = CString::new(invalid_file_path.to_str().unwrap()).unwrap();
    assert_eq!(unsafe { ffi::get_duration(c_path.as_ptr()) }, -1.0);
    assert_eq!(unsafe { ffi::get_frame_count(c_path.as_ptr()) }, -1);
}

#[test]
fn missing_file_error_message() {
    let error = duration_seconds("this_file_does_not_exist.mp4").unwrap_err();
    assert!(
        error.to_string().contains("Failed to open media file"),
        "unexpected message: {error}"
    );
}
