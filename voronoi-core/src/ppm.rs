//! Binary pixel-map (PPM `P6`) encoding.
//!
//! Alpha is not representable in this format and is dropped; reading a file
//! back yields only the RGB channels.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{PixelSource, Result, VoronoiError};

/// Raw RGB bytes, row-major, top to bottom
pub fn encode_rgb<V: PixelSource + ?Sized>(view: &V) -> Vec<u8> {
    let (w, h) = (view.width(), view.height());
    let mut bytes = Vec::with_capacity(w as usize * h as usize * 3);
    for y in 0..h {
        for x in 0..w {
            bytes.extend_from_slice(&view.pixel(x, y).to_rgb());
        }
    }
    bytes
}

/// Write `P6\n<width> <height>\n255\n` followed by the RGB triples
pub fn write_ppm<V, W>(view: &V, out: &mut W) -> std::io::Result<()>
where
    V: PixelSource + ?Sized,
    W: Write + ?Sized,
{
    let (w, h) = (view.width(), view.height());
    write!(out, "P6\n{} {}\n255\n", w, h)?;
    let mut row = Vec::with_capacity(w as usize * 3);
    for y in 0..h {
        row.clear();
        for x in 0..w {
            row.extend_from_slice(&view.pixel(x, y).to_rgb());
        }
        out.write_all(&row)?;
    }
    Ok(())
}

/// Create `path` and write the view into it
pub fn save_ppm<V: PixelSource + ?Sized>(view: &V, path: &Path) -> Result<()> {
    let io_err = |source: std::io::Error| VoronoiError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    write_ppm(view, &mut out).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    Ok(())
}
