use std::{env, path::PathBuf};

const WATCHED_VARIABLES: [&str; 3] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere except
    // Windows, where it needs FFMPEG_DIR.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        Some(directory) if directory.join("include").join("libavformat").exists() => {
            println!(
                "cargo:warning=FFMPEG_DIR is not set; found a vcpkg FFmpeg at {0}. Set FFMPEG_DIR={0} so the video-probe DLL links against it.",
                directory.display()
            );
        }
        Some(directory) => {
            println!(
                "cargo:warning=VCPKG_ROOT is set but {} has no FFmpeg headers. Run `vcpkg install ffmpeg` for that triplet.",
                directory.display()
            );
        }
        None => {
            println!(
                "cargo:warning=FFMPEG_DIR is not set. Install FFmpeg (e.g. via vcpkg) and point FFMPEG_DIR at it to build video-probe on Windows."
            );
        }
    }
}

fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}
