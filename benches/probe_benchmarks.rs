//! Benchmarks for duration, frame count, and frame extraction.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{ffi::CString, path::Path, time::Duration};

use criterion::Criterion;
use video_probe::{ExtractOptions, FfmpegLogLevel, MediaHandle, extract_frame_image, ffi};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn benchmark_metadata(criterion: &mut Criterion) {
    video_probe::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("duration", |bencher| {
        bencher.iter(|| video_probe::duration_seconds(SAMPLE_VIDEO).unwrap());
    });

    criterion.bench_function("frame count", |bencher| {
        bencher.iter(|| video_probe::frame_count(SAMPLE_VIDEO).unwrap());
    });
}

fn benchmark_frame_extraction(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let options = ExtractOptions::default();
    let mut group = criterion.benchmark_group("extract frame");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("first frame image", |bencher| {
        bencher.iter(|| {
            let mut handle = MediaHandle::open(SAMPLE_VIDEO).unwrap();
            extract_frame_image(&mut handle, 0, &options).unwrap()
        });
    });

    group.bench_function("mid-video seek image", |bencher| {
        bencher.iter(|| {
            let mut handle = MediaHandle::open(SAMPLE_VIDEO).unwrap();
            extract_frame_image(&mut handle, 150, &options).unwrap()
        });
    });

    group.bench_function("mid-video seek jpeg", |bencher| {
        bencher.iter(|| video_probe::extract_frame_jpeg(SAMPLE_VIDEO, 150, &options).unwrap());
    });

    group.finish();
}

fn benchmark_ffi_round_trip(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let path = CString::new(SAMPLE_VIDEO).unwrap();
    criterion.bench_function("ffi extract and free", |bencher| {
        bencher.iter(|| {
            let mut size = 0;
            let buffer = unsafe { ffi::extract_frame(path.as_ptr(), 150, &mut size) };
            assert!(!buffer.is_null());
            unsafe { ffi::free_frame(buffer) };
        });
    });
}

criterion::criterion_group!(
    benches,
    benchmark_metadata,
    benchmark_frame_extraction,
    benchmark_ffi_round_trip,
);
criterion::criterion_main!(benches);
