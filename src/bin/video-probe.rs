use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use video_probe::{
    ContainerDuration, ExtractOptions, FfmpegLogLevel, MediaHandle, estimate_frame_count,
    extract_frame_jpeg,
};

const CLI_AFTER_HELP: &str = "Examples:\n  video-probe duration input.mp4\n  video-probe frame-count input.mp4\n  video-probe extract input.mp4 --frame 150 --out frame.jpg\n  video-probe info input.mp4 --json";

#[derive(Debug, Parser)]
#[command(
    name = "video-probe",
    version,
    about = "Read duration, frame count, and single JPEG frames from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the duration in seconds.
    Duration {
        /// Input media path or file:// URI.
        input: String,
    },

    /// Print the estimated frame count of the primary video track.
    FrameCount {
        /// Input media path or file:// URI.
        input: String,
    },

    /// Extract one frame as JPEG.
    #[command(
        after_help = "Examples:\n  video-probe extract input.mp4 --frame 0 --out first.jpg\n  video-probe extract input.mp4 --frame 300 --out raw.jpg --quality 75 --no-transform"
    )]
    Extract {
        /// Input media path or file:// URI.
        input: String,
        /// Zero-based frame index.
        #[arg(long, allow_negative_numbers = true)]
        frame: i32,
        /// Output JPEG path.
        #[arg(long)]
        out: PathBuf,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = video_probe::DEFAULT_JPEG_QUALITY)]
        quality: u8,
        /// Keep the stored orientation instead of the playback orientation.
        #[arg(long)]
        no_transform: bool,
    },

    /// Print container and video track details.
    #[command(visible_alias = "probe")]
    Info {
        /// Input media path or file:// URI.
        input: String,
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level: FfmpegLogLevel = cli.global.log_level.parse()?;
    video_probe::set_ffmpeg_log_level(level);

    match cli.command {
        Commands::Duration { input } => {
            let seconds = video_probe::duration_seconds(&input)?;
            println!("{seconds:.6}");
        }
        Commands::FrameCount { input } => {
            let count = video_probe::frame_count(&input)?;
            println!("{count}");
        }
        Commands::Extract {
            input,
            frame,
            out,
            quality,
            no_transform,
        } => {
            let options = ExtractOptions::new()
                .with_jpeg_quality(quality)
                .with_display_transform(!no_transform);
            let jpeg = extract_frame_jpeg(&input, frame, &options)?;
            fs::write(&out, &jpeg)?;
            if cli.global.verbose {
                eprintln!("frame {frame}: {} bytes", jpeg.len());
            }
            println!("{} {}", "saved".green().bold(), out.display());
        }
        Commands::Info { input, json } => {
            let handle = MediaHandle::open(&input)?;
            let duration = match handle.duration() {
                ContainerDuration::Known(seconds) => Some(seconds),
                ContainerDuration::Unknown => None,
            };
            let video = handle.video_track().ok();
            let frame_count = match (duration, video) {
                (Some(seconds), Some(video)) => {
                    estimate_frame_count(seconds, video.frames_per_second).ok()
                }
                _ => None,
            };

            if json {
                let payload = json!({
                    "path": handle.path().display().to_string(),
                    "duration_seconds": duration,
                    "frame_count": frame_count,
                    "video": video.map(|video| {
                        let (display_width, display_height) = video.display_dimensions();
                        json!({
                            "stream_index": video.stream_index,
                            "codec": video.codec,
                            "width": video.width,
                            "height": video.height,
                            "display_width": display_width,
                            "display_height": display_height,
                            "frames_per_second": video.frames_per_second,
                            "display_transform": format!("{:?}", video.display_transform),
                        })
                    }),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{} {}", "file:".bold(), handle.path().display());
                match duration {
                    Some(seconds) => println!("{} {seconds:.3}s", "duration:".bold()),
                    None => println!("{} {}", "duration:".bold(), "unknown".yellow()),
                }
                match video {
                    Some(video) => {
                        let (display_width, display_height) = video.display_dimensions();
                        println!(
                            "{} {} {}x{} @ {:.3} fps (displayed {}x{}, {:?})",
                            "video:".bold(),
                            video.codec,
                            video.width,
                            video.height,
                            video.frames_per_second,
                            display_width,
                            display_height,
                            video.display_transform,
                        );
                    }
                    None => println!("{} {}", "video:".bold(), "none".yellow()),
                }
                if let Some(count) = frame_count {
                    println!("{} ~{count}", "frames:".bold());
                }
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
