use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbImage;
use kmeans_colors::get_kmeans_hamerly;
use palette::Lab;
use thiserror::Error;

use crate::color::Color;
use crate::image_store::{self, DecodeError};

/// Swatch count shown in the side panel.
pub const PALETTE_SIZE: usize = 8;

const MAX_DIM: u32 = 256;
const MAX_ITER: usize = 20;
const CONVERGE: f32 = 5.0;
const SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("image has no pixels: {}", .0.display())]
    EmptyImage(PathBuf),
}

/// Extract the `count` dominant colors of the image at `path`, most
/// dominant first, always exactly `count` entries.
///
/// The file is re-read and bounded to 256x256 for clustering, independent
/// of the display copy. Images with at most `count` distinct colors are
/// ranked by pixel frequency directly; larger images go through K-means in
/// CIELAB space (Hamerly's algorithm, fixed seed, so results are stable
/// across runs). Every returned color is a color that actually occurs in
/// the image; short rankings are padded by cycling from the top.
pub fn extract(path: &Path, count: usize) -> Result<Vec<Color>, PaletteError> {
    debug_assert!(count > 0);
    let img = image_store::decode(path)?;
    let img = if img.width() > MAX_DIM || img.height() > MAX_DIM {
        img.resize(MAX_DIM, MAX_DIM, FilterType::Lanczos3)
    } else {
        img
    };
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(PaletteError::EmptyImage(path.to_path_buf()));
    }

    let distinct = rank_distinct(&rgb);
    let mut ranked: Vec<Color> = if distinct.len() <= count {
        distinct.iter().map(|&(color, _)| color).collect()
    } else {
        cluster(&rgb, &distinct, count)
    };
    pad_cycle(&mut ranked, count);

    log::debug!(
        "palette for {}: {} distinct colors -> {:?}",
        path.display(),
        distinct.len(),
        ranked.iter().map(|c| c.to_hex()).collect::<Vec<_>>()
    );
    Ok(ranked)
}

/// Distinct pixel colors ordered by frequency, most frequent first.
/// Ties break on the channel values so the ranking is deterministic.
fn rank_distinct(img: &RgbImage) -> Vec<(Color, u32)> {
    let mut counts: HashMap<Color, u32> = HashMap::new();
    for p in img.pixels() {
        *counts.entry(Color::from(*p)).or_insert(0) += 1;
    }
    let mut ranked: Vec<(Color, u32)> = counts.into_iter().collect();
    ranked.sort_by_key(|&(c, n)| (Reverse(n), (c.r, c.g, c.b)));
    ranked
}

/// K-means path for images with more distinct colors than swatches.
/// Centroids are ranked by cluster population, then snapped to the nearest
/// color that really occurs in the image so swatches never show invented
/// in-between colors.
fn cluster(img: &RgbImage, distinct: &[(Color, u32)], k: usize) -> Vec<Color> {
    let pixels: Vec<Lab> = img.pixels().map(|p| Color::from(*p).to_lab()).collect();
    let result = get_kmeans_hamerly(k, MAX_ITER, CONVERGE, false, &pixels, SEED);

    let mut counts = vec![0u32; k];
    for &idx in &result.indices {
        counts[idx as usize] += 1;
    }

    let mut order: Vec<usize> = (0..k).filter(|&i| counts[i] > 0).collect();
    order.sort_by_key(|&i| (Reverse(counts[i]), i));

    let mut snapped: Vec<Color> = order
        .into_iter()
        .map(|i| snap_to_actual(Color::from_lab(result.centroids[i]), distinct))
        .collect();

    // Snapping can land two centroids on the same pixel color.
    let mut seen = HashSet::new();
    snapped.retain(|&c| seen.insert(c));
    snapped
}

fn snap_to_actual(approx: Color, distinct: &[(Color, u32)]) -> Color {
    let mut best = distinct[0].0;
    let mut best_d = approx.distance_sq(best);
    for &(c, _) in &distinct[1..] {
        let d = approx.distance_sq(c);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

fn pad_cycle(colors: &mut Vec<Color>, count: usize) {
    debug_assert!(!colors.is_empty());
    let base = colors.len();
    for i in base..count {
        let repeat = colors[i % base];
        colors.push(repeat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn create_solid(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
        let img = image::RgbImage::from_fn(width, height, |_, _| image::Rgb(rgb));
        img.save(path).unwrap();
    }

    #[test]
    fn solid_image_yields_identical_swatches() {
        let path = fixture_path("palette_solid.png");
        create_solid(&path, 16, 16, [200, 50, 50]);

        let colors = extract(&path, PALETTE_SIZE).unwrap();
        assert_eq!(colors, vec![Color::new(200, 50, 50); PALETTE_SIZE]);
    }

    #[test]
    fn two_color_image_cycles_by_frequency() {
        let path = fixture_path("palette_two.png");
        // Three quarters red, one quarter blue.
        let img = image::RgbImage::from_fn(16, 16, |x, _| {
            if x < 12 {
                image::Rgb([200, 50, 50])
            } else {
                image::Rgb([50, 50, 200])
            }
        });
        img.save(&path).unwrap();

        let colors = extract(&path, PALETTE_SIZE).unwrap();
        let red = Color::new(200, 50, 50);
        let blue = Color::new(50, 50, 200);
        assert_eq!(
            colors,
            vec![red, blue, red, blue, red, blue, red, blue]
        );
    }

    #[test]
    fn few_distinct_colors_rank_by_count() {
        let path = fixture_path("palette_three.png");
        // Counts: a=6, b=3, c=1 on a 1x10 strip.
        let a = [10, 10, 10];
        let b = [100, 100, 100];
        let c = [250, 250, 250];
        let img = image::RgbImage::from_fn(10, 1, |x, _| match x {
            0..=5 => image::Rgb(a),
            6..=8 => image::Rgb(b),
            _ => image::Rgb(c),
        });
        img.save(&path).unwrap();

        let colors = extract(&path, PALETTE_SIZE).unwrap();
        let (a, b, c) = (Color::new(10, 10, 10), Color::new(100, 100, 100), Color::new(250, 250, 250));
        assert_eq!(colors, vec![a, b, c, a, b, c, a, b]);
    }

    #[test]
    fn busy_image_yields_eight_real_colors() {
        let path = fixture_path("palette_busy.png");
        let img = image::RgbImage::from_fn(16, 16, |x, y| {
            image::Rgb([x as u8 * 16, y as u8 * 16, 128])
        });
        img.save(&path).unwrap();

        let colors = extract(&path, PALETTE_SIZE).unwrap();
        assert_eq!(colors.len(), PALETTE_SIZE);

        let present: HashSet<Color> = img.pixels().map(|p| Color::from(*p)).collect();
        for color in &colors {
            assert!(
                present.contains(color),
                "{} does not occur in the image",
                color.to_hex()
            );
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let path = fixture_path("palette_seeded.png");
        let img = image::RgbImage::from_fn(32, 32, |x, y| {
            image::Rgb([x as u8 * 8, y as u8 * 8, (x + y) as u8 * 4])
        });
        img.save(&path).unwrap();

        let first = extract(&path, PALETTE_SIZE).unwrap();
        let second = extract(&path, PALETTE_SIZE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_surfaces_decode_error() {
        let err = extract(Path::new("/nonexistent/image.png"), PALETTE_SIZE).unwrap_err();
        assert!(
            matches!(err, PaletteError::Decode(DecodeError::NotFound(_))),
            "got {err:?}"
        );
    }

    #[test]
    fn garbage_file_surfaces_decode_error() {
        let path = fixture_path("palette_garbage.bin");
        std::fs::write(&path, b"not an image at all").unwrap();
        let err = extract(&path, PALETTE_SIZE).unwrap_err();
        assert!(
            matches!(err, PaletteError::Decode(DecodeError::Unsupported { .. })),
            "got {err:?}"
        );
    }
}
