//! End-to-end tests verifying deterministic Voronoi output.
//!
//! These tests ensure that given the same seed, rendering produces
//! identical output across runs and across algorithms.

use std::path::PathBuf;
use voronoi_core::{
    palette, render_seed_markers, save_ppm, Canvas, Color, PixelSource, RenderMode, SeedSet,
    VoronoiRenderer,
};

const WIDTH: u32 = 192;
const HEIGHT: u32 = 108;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("voronoi-cli-test-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}

fn render_single_frame(mode: RenderMode, sites: usize, seed: u64) -> Canvas {
    let seeds = SeedSet::random(sites, WIDTH, HEIGHT, seed).expect("Seed generation failed");
    let mut canvas = Canvas::filled(WIDTH, HEIGHT, Color::BACKGROUND);
    VoronoiRenderer::new(mode)
        .render(&mut canvas, seeds.points(), &palette::CYBERPUNK)
        .expect("Render failed");
    canvas
}

fn assert_canvases_equal(expected: &Canvas, actual: &Canvas, name: &str) {
    assert_eq!(
        (expected.width(), expected.height()),
        (actual.width(), actual.height()),
        "{}: dimensions mismatch",
        name
    );
    let mismatches = expected
        .pixels()
        .iter()
        .zip(actual.pixels())
        .filter(|(a, b)| a != b)
        .count();
    assert_eq!(mismatches, 0, "{}: {} pixels differ", name, mismatches);
}

#[test]
fn test_reproducibility() {
    for mode in [RenderMode::Euclidean, RenderMode::Manhattan, RenderMode::Incremental] {
        let result1 = render_single_frame(mode, 9, 12345);
        let result2 = render_single_frame(mode, 9, 12345);
        assert_canvases_equal(&result1, &result2, &format!("reproducibility_{}", mode));
    }
}

#[test]
fn test_different_seeds_produce_different_output() {
    let result1 = render_single_frame(RenderMode::Euclidean, 9, 0);
    let result2 = render_single_frame(RenderMode::Euclidean, 9, 1);
    assert_ne!(
        result1.pixels(),
        result2.pixels(),
        "Different seeds should produce different output"
    );
}

#[test]
fn test_direct_and_incremental_agree() {
    for seed in [0, 1, 42, 123, 9999] {
        for sites in [1, 2, 9, 50] {
            let direct = render_single_frame(RenderMode::Euclidean, sites, seed);
            let incremental = render_single_frame(RenderMode::Incremental, sites, seed);
            assert_canvases_equal(
                &direct,
                &incremental,
                &format!("parity_{}sites_seed{}", sites, seed),
            );
        }
    }
}

#[test]
fn test_every_pixel_uses_palette() {
    let canvas = render_single_frame(RenderMode::Manhattan, 9, 7);
    assert!(canvas
        .pixels()
        .iter()
        .all(|c| palette::CYBERPUNK.contains(c)));
}

#[test]
fn test_ppm_file_round_trip() {
    let seeds = SeedSet::random(9, WIDTH, HEIGHT, 5).unwrap();
    let mut canvas = render_single_frame(RenderMode::Incremental, 9, 5);
    render_seed_markers(&mut canvas, seeds.points());

    let dir = scratch_dir("roundtrip");
    let path = dir.join("img.ppm");
    save_ppm(&canvas, &path).expect("Failed to save ppm");

    let bytes = std::fs::read(&path).unwrap();
    let header = format!("P6\n{} {}\n255\n", WIDTH, HEIGHT);
    assert!(bytes.starts_with(header.as_bytes()));
    assert_eq!(bytes.len(), header.len() + (WIDTH * HEIGHT * 3) as usize);

    // Alpha is not stored in the format, so only RGB is compared
    let decoded = image::open(&path).expect("Failed to decode ppm").to_rgb8();
    assert_eq!(decoded.as_raw(), canvas.to_image().as_raw());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_shifted_frame_round_trip() {
    let canvas = render_single_frame(RenderMode::Euclidean, 9, 3);
    let dir = scratch_dir("shifted");
    let path = dir.join("output-017.ppm");
    let view = canvas.shifted(17, 17);
    save_ppm(&view, &path).unwrap();

    let decoded = image::open(&path).unwrap().to_rgb8();
    for (x, y) in [(0, 0), (WIDTH - 1, 0), (0, HEIGHT - 1), (100, 50)] {
        let expected = canvas
            .get((x + 17) % WIDTH, (y + 17) % HEIGHT)
            .unwrap()
            .to_rgb();
        assert_eq!(decoded.get_pixel(x, y).0, expected, "pixel ({}, {})", x, y);
        assert_eq!(view.pixel(x, y).to_rgb(), expected);
    }

    std::fs::remove_dir_all(&dir).ok();
}
