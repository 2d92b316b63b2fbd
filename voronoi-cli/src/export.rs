//! Writing the finished canvas: single images, or a scrolling frame
//! sequence assembled by ffmpeg or the GIF encoder.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use voronoi_core::{save_ppm, Canvas, Color, PixelSource};

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Single binary pixel map
    Ppm,
    /// Single PNG
    Png,
    /// Frame sequence encoded by an external ffmpeg process
    Mp4,
    /// Frame sequence encoded in-process as an animated GIF
    Gif,
}

impl SaveMode {
    pub fn default_output(self) -> &'static str {
        match self {
            SaveMode::Ppm => "img.ppm",
            SaveMode::Png => "img.png",
            SaveMode::Mp4 => "output.mp4",
            SaveMode::Gif => "output.gif",
        }
    }
}

impl FromStr for SaveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ppm" => Ok(SaveMode::Ppm),
            "png" => Ok(SaveMode::Png),
            "mp4" => Ok(SaveMode::Mp4),
            "gif" => Ok(SaveMode::Gif),
            other => Err(format!("unknown save mode '{}' (expected ppm, png, mp4 or gif)", other)),
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveMode::Ppm => "ppm",
            SaveMode::Png => "png",
            SaveMode::Mp4 => "mp4",
            SaveMode::Gif => "gif",
        };
        f.write_str(name)
    }
}

/// Persist `canvas` according to `mode`
pub fn save(
    canvas: &Canvas,
    mode: SaveMode,
    settings: &Settings,
    interrupted: &AtomicBool,
) -> anyhow::Result<()> {
    let output = settings.output_for(mode);
    match mode {
        SaveMode::Ppm => {
            save_ppm(canvas, &output)?;
            println!("Output saved to: {:?}", output);
        }
        SaveMode::Png => {
            canvas
                .save_png(&output)
                .with_context(|| format!("could not write file {:?}", output))?;
            println!("Output saved to: {:?}", output);
        }
        SaveMode::Mp4 => {
            let dir = &settings.frames_dir;
            let frames = write_frame_sequence(canvas, settings.frames, dir, interrupted)?;
            if frames.is_empty() {
                eprintln!("No frames written.");
                return Ok(());
            }
            let encoded = run_ffmpeg(&dir.join(FRAME_PATTERN), settings.fps, &output);
            if !encoded {
                eprintln!("Frames kept in {:?}", dir);
            } else if !settings.keep_frames {
                remove_frames(&frames);
            }
        }
        SaveMode::Gif => {
            let written = write_gif(canvas, settings.frames, settings.fps, &output, interrupted)?;
            println!("Output saved to: {:?} ({} frames)", output, written);
        }
    }
    Ok(())
}

/// ffmpeg input pattern matching [`frame_file_name`]
const FRAME_PATTERN: &str = "output-%03d.ppm";

fn frame_file_name(index: usize) -> String {
    format!("output-{:03}.ppm", index)
}

/// Whether `name` is one of ours, i.e. would be picked up by [`FRAME_PATTERN`]
fn is_frame_file_name(name: &str) -> bool {
    name.strip_prefix("output-")
        .and_then(|rest| rest.strip_suffix(".ppm"))
        .is_some_and(|digits| digits.len() >= 3 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Remove frames left in `dir` by an earlier run so ffmpeg never reads them
fn clear_stale_frames(dir: &Path) -> anyhow::Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir).with_context(|| format!("could not read {:?}", dir))? {
        let path = entry?.path();
        let is_frame = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_frame_file_name);
        if is_frame && path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("could not remove stale frame {:?}", path))?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("removed {} stale frames from {:?}", removed, dir);
    }
    Ok(removed)
}

/// Shift applied to frame `index`: the same amount on both axes.
fn frame_offset(canvas: &Canvas, index: usize) -> (u32, u32) {
    let i = index as u64;
    (
        (i % canvas.width() as u64) as u32,
        (i % canvas.height() as u64) as u32,
    )
}

fn progress_bar(len: usize) -> anyhow::Result<ProgressBar> {
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );
    Ok(progress)
}

/// Write `count` frames into `dir`, frame `i` scrolled by `i` pixels on both axes.
///
/// Stops early on Ctrl+C and returns the frames written so far.
fn write_frame_sequence(
    canvas: &Canvas,
    count: usize,
    dir: &Path,
    interrupted: &AtomicBool,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create directory {:?}", dir))?;
    clear_stale_frames(dir)?;
    println!("Writing {} frames to {:?}", count, dir);

    let progress = progress_bar(count)?;
    let mut written = Vec::with_capacity(count);
    for i in 0..count {
        if interrupted.load(Ordering::Relaxed) {
            progress.abandon_with_message("Interrupted");
            eprintln!("Interrupted after {} of {} frames", written.len(), count);
            return Ok(written);
        }
        let (dx, dy) = frame_offset(canvas, i);
        let path = dir.join(frame_file_name(i));
        save_ppm(&canvas.shifted(dx, dy), &path)?;
        written.push(path);
        progress.inc(1);
    }
    progress.finish_with_message("Frames complete");
    Ok(written)
}

/// Arguments for encoding the frame sequence at `pattern` into `output`.
///
/// libx264 with yuv420p needs even dimensions, so odd sizes are padded.
fn ffmpeg_args(pattern: &Path, fps: u32, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-framerate".into(), fps.to_string().into()];
    args.push("-i".into());
    args.push(pattern.into());
    for arg in [
        "-vf",
        "pad=ceil(iw/2)*2:ceil(ih/2)*2",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-crf",
        "18",
    ] {
        args.push(arg.into());
    }
    args.push(output.into());
    args
}

/// Assemble frames into a video. A failing ffmpeg is reported but does not
/// fail the run; returns whether the video was written.
fn run_ffmpeg(pattern: &Path, fps: u32, output: &Path) -> bool {
    info!("encoding {:?} -> {:?}", pattern, output);
    let status = Command::new("ffmpeg")
        .args(ffmpeg_args(pattern, fps, output))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => {
            println!("Output saved to: {:?}", output);
            true
        }
        Ok(status) => {
            eprintln!("ERROR: ffmpeg exited with {}", status);
            false
        }
        Err(e) => {
            eprintln!("ERROR: failed to run ffmpeg: {}", e);
            false
        }
    }
}

fn remove_frames(frames: &[PathBuf]) {
    for path in frames {
        if let Err(e) = std::fs::remove_file(path) {
            eprintln!("Warning: could not remove {:?}: {}", path, e);
        }
    }
}

/// Indexed palette for GIF frames.
///
/// Every frame is a rotation of the same canvas, so one global palette
/// built from the canvas covers the whole animation. Past 256 distinct
/// colors, later colors map to the nearest palette entry.
struct GifPalette {
    entries: Vec<[u8; 3]>,
    index_of: HashMap<Color, u8>,
}

impl GifPalette {
    fn build(canvas: &Canvas) -> Self {
        let mut entries: Vec<[u8; 3]> = Vec::new();
        let mut index_of = HashMap::new();
        for &color in canvas.pixels() {
            if index_of.contains_key(&color) {
                continue;
            }
            let rgb = color.to_rgb();
            let idx = match entries.iter().position(|&c| c == rgb) {
                Some(i) => i,
                None if entries.len() < 256 => {
                    entries.push(rgb);
                    entries.len() - 1
                }
                None => nearest_entry(&entries, rgb),
            };
            index_of.insert(color, idx as u8);
        }
        debug!("gif palette: {} entries for {} colors", entries.len(), index_of.len());
        Self { entries, index_of }
    }

    fn flat(&self) -> Vec<u8> {
        let mut flat: Vec<u8> = self.entries.iter().flat_map(|c| c.iter().copied()).collect();
        flat.resize(256 * 3, 0);
        flat
    }

    fn index_frame<V: PixelSource>(&self, view: &V) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(view.width() as usize * view.height() as usize);
        for y in 0..view.height() {
            for x in 0..view.width() {
                pixels.push(self.index_of.get(&view.pixel(x, y)).copied().unwrap_or(0));
            }
        }
        pixels
    }
}

fn nearest_entry(entries: &[[u8; 3]], rgb: [u8; 3]) -> usize {
    entries
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| {
            let dr = c[0] as i32 - rgb[0] as i32;
            let dg = c[1] as i32 - rgb[1] as i32;
            let db = c[2] as i32 - rgb[2] as i32;
            dr * dr + dg * dg + db * db
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Encode the scrolling sequence as an infinitely looping GIF. Returns frames written.
fn write_gif(
    canvas: &Canvas,
    count: usize,
    fps: u32,
    output: &Path,
    interrupted: &AtomicBool,
) -> anyhow::Result<usize> {
    use gif::{Encoder, Frame, Repeat};

    let width = u16::try_from(canvas.width()).context("canvas too wide for GIF")?;
    let height = u16::try_from(canvas.height()).context("canvas too tall for GIF")?;
    let palette = GifPalette::build(canvas);

    let file = std::fs::File::create(output)
        .with_context(|| format!("could not write file {:?}", output))?;
    let mut encoder = Encoder::new(file, width, height, &palette.flat())?;
    encoder.set_repeat(Repeat::Infinite)?;
    let frame_delay = (100 / fps).max(1) as u16;

    let progress = progress_bar(count)?;
    let mut written = 0;
    for i in 0..count {
        if interrupted.load(Ordering::Relaxed) {
            progress.abandon_with_message("Interrupted");
            eprintln!("Interrupted after {} of {} frames", written, count);
            break;
        }
        let (dx, dy) = frame_offset(canvas, i);
        let frame = Frame {
            width,
            height,
            delay: frame_delay,
            buffer: palette.index_frame(&canvas.shifted(dx, dy)).into(),
            ..Frame::default()
        };
        encoder.write_frame(&frame)?;
        written += 1;
        progress.inc(1);
    }
    if written == count {
        progress.finish_with_message("Encoding complete");
    }
    Ok(written)
}
