//! Voronoi diagram CLI
//!
//! Scatters seed points over a canvas, colors every pixel by its nearest
//! seed, and saves the result.
//!
//! Run with: `voronoi interesting ppm`
//!
//! Render modes: `euclidean`, `manhattan`, `interesting` (incremental,
//! with seed markers), `gradient` (packed-coordinate debug view).
//!
//! Save modes: `ppm`, `png`, `mp4` (frames + ffmpeg), `gif`.
//!
//! An unknown mode is reported and that stage is skipped. Settings can also
//! come from a YAML file via `--config`; see [`config`].
//!
//! ## Graceful interruption
//!
//! During mp4/gif export, Ctrl+C stops writing frames and finishes the
//! output from the frames written so far.

mod config;
mod export;

use std::fmt::Display;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::debug;
use voronoi_core::{
    palette, render_seed_markers, Canvas, Color, RenderMode, SeedSet, VoronoiRenderer,
};

use crate::config::{load_spec, Args, Settings};
use crate::export::SaveMode;

/// Parse a mode argument; an unknown value is reported and skipped.
fn parse_stage<T>(value: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value.parse::<T>() {
        Ok(mode) => Some(mode),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Set up SIGINT handler
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    let spec = args.config.as_ref().map(load_spec).transpose()?;
    let settings = Settings::resolve(&args, spec.as_ref())?;
    debug!("settings: {:?}", settings);

    let render_mode = parse_stage::<RenderMode>(&args.render_mode);
    let save_mode = parse_stage::<SaveMode>(&args.save_mode);

    let (width, height) = (settings.width, settings.height);
    let mut canvas = Canvas::filled(width, height, Color::BACKGROUND);
    let seeds = SeedSet::random(settings.seeds, width, height, settings.seed)?;
    println!("Canvas: {}x{}, {} seeds (seed: {})", width, height, seeds.len(), settings.seed);

    if let Some(mode) = render_mode {
        let start = Instant::now();
        VoronoiRenderer::new(mode).render(&mut canvas, seeds.points(), &palette::CYBERPUNK)?;

        let markers = settings.markers.unwrap_or_else(|| mode.default_markers());
        if markers && mode.supports_markers() {
            render_seed_markers(&mut canvas, seeds.points());
        } else if markers {
            eprintln!("Warning: seed markers are not drawn in {} mode", mode);
        }
        println!(
            "Rendered {} in {:.1} ms",
            mode,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    if let Some(mode) = save_mode {
        export::save(&canvas, mode, &settings, &interrupted)?;
    }
    Ok(())
}
