//! Command-line arguments, YAML render spec, and the settings resolved from both.
//!
//! ## YAML render spec
//!
//! ```yaml
//! width: 1920
//! height: 1080
//! seeds: 9
//! seed: 42
//! frames: 600
//! fps: 60
//! markers: true
//! output: out.mp4
//! frames_dir: frames
//! ```
//!
//! Command-line values take precedence over the file.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use crate::export::SaveMode;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;
pub const DEFAULT_SEEDS: usize = 9;
pub const DEFAULT_FRAMES: usize = 600;
pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_FRAMES_DIR: &str = "frames";

#[derive(Parser, Debug)]
#[command(name = "voronoi")]
#[command(about = "Render Voronoi diagrams", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Render mode: euclidean | manhattan | interesting | gradient
    pub render_mode: String,

    /// Save mode: ppm | png | mp4 | gif
    pub save_mode: String,

    /// Output file path (default depends on save mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of seed points
    #[arg(long)]
    pub seeds: Option<usize>,

    /// Random seed for reproducibility (default: current time)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames for mp4/gif export
    #[arg(long)]
    pub frames: Option<usize>,

    /// Frames per second for mp4/gif export
    #[arg(long)]
    pub fps: Option<u32>,

    /// Directory for intermediate frame files (mp4)
    #[arg(long)]
    pub frames_dir: Option<PathBuf>,

    /// Draw seed markers regardless of render mode
    #[arg(long, conflicts_with = "no_markers")]
    pub markers: bool,

    /// Never draw seed markers
    #[arg(long)]
    pub no_markers: bool,

    /// Keep intermediate frame files after ffmpeg finishes
    #[arg(long)]
    pub keep_frames: bool,

    /// YAML render spec file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// YAML render spec file format
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSpec {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub seeds: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub frames: Option<usize>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub markers: Option<bool>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub frames_dir: Option<PathBuf>,
    #[serde(default)]
    pub keep_frames: Option<bool>,
}

pub fn load_spec(path: &PathBuf) -> anyhow::Result<RenderSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read spec file: {:?}", path))?;
    parse_spec(&contents).with_context(|| format!("failed to parse spec file: {:?}", path))
}

pub fn parse_spec(contents: &str) -> anyhow::Result<RenderSpec> {
    Ok(serde_yaml::from_str(contents)?)
}

/// Settings after merging CLI args over the spec file over defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub seeds: usize,
    pub seed: u64,
    pub frames: usize,
    pub fps: u32,
    /// `None` = use the render mode's default
    pub markers: Option<bool>,
    /// `None` = use the save mode's default
    pub output: Option<PathBuf>,
    pub frames_dir: PathBuf,
    pub keep_frames: bool,
}

impl Settings {
    pub fn resolve(args: &Args, spec: Option<&RenderSpec>) -> anyhow::Result<Self> {
        let default_spec = RenderSpec::default();
        let spec = spec.unwrap_or(&default_spec);

        let markers = if args.markers {
            Some(true)
        } else if args.no_markers {
            Some(false)
        } else {
            spec.markers
        };

        let settings = Self {
            width: args.width.or(spec.width).unwrap_or(DEFAULT_WIDTH),
            height: args.height.or(spec.height).unwrap_or(DEFAULT_HEIGHT),
            seeds: args.seeds.or(spec.seeds).unwrap_or(DEFAULT_SEEDS),
            seed: args.seed.or(spec.seed).unwrap_or_else(clock_seed),
            frames: args.frames.or(spec.frames).unwrap_or(DEFAULT_FRAMES),
            fps: args.fps.or(spec.fps).unwrap_or(DEFAULT_FPS),
            markers,
            output: args.output.clone().or_else(|| spec.output.clone()),
            frames_dir: args
                .frames_dir
                .clone()
                .or_else(|| spec.frames_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRAMES_DIR)),
            keep_frames: args.keep_frames || spec.keep_frames.unwrap_or(false),
        };

        if settings.width == 0 || settings.height == 0 {
            anyhow::bail!(
                "canvas must be at least 1x1, got {}x{}",
                settings.width,
                settings.height
            );
        }
        if settings.seeds == 0 {
            anyhow::bail!("at least one seed is required");
        }
        if settings.fps == 0 {
            anyhow::bail!("fps must be positive");
        }
        Ok(settings)
    }

    pub fn output_for(&self, mode: SaveMode) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| Path::new(mode.default_output()).to_path_buf())
    }
}

/// Seconds since the epoch, for runs without an explicit seed
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
