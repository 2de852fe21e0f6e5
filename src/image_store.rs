use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use thiserror::Error;

use crate::color::Color;

/// Longest side of the display copy. The picker samples pixels from this
/// bounded image, so sample coordinates are display coordinates.
pub const MAX_DISPLAY_DIM: u32 = 400;

/// Failure to turn a file into a displayable image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error(
        "unsupported or corrupt image: {}. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF",
        path.display()
    )]
    Unsupported {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Pixel read outside the display image.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    #[error("sample point ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Decode an image file, telling a missing file apart from one the codec
/// cannot read.
pub fn decode(path: &Path) -> Result<DynamicImage, DecodeError> {
    image::open(path).map_err(|source| {
        if path.exists() {
            DecodeError::Unsupported {
                path: path.to_path_buf(),
                source,
            }
        } else {
            DecodeError::NotFound(path.to_path_buf())
        }
    })
}

/// The currently loaded image: source identity plus the display copy that
/// all sampling reads from. Replaced wholesale on the next successful load.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    path: PathBuf,
    source_width: u32,
    source_height: u32,
    display: RgbImage,
}

impl LoadedImage {
    /// Decode `path` and derive the display copy: an aspect-preserving
    /// Lanczos3 resize so neither side exceeds [`MAX_DISPLAY_DIM`]. Images
    /// already within the bound are kept at native size.
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let img = decode(path)?;

        let source_width = img.width();
        let source_height = img.height();
        let img = if source_width > MAX_DISPLAY_DIM || source_height > MAX_DISPLAY_DIM {
            img.resize(MAX_DISPLAY_DIM, MAX_DISPLAY_DIM, FilterType::Lanczos3)
        } else {
            img
        };

        log::debug!(
            "loaded {} ({}x{} -> display {}x{})",
            path.display(),
            source_width,
            source_height,
            img.width(),
            img.height()
        );

        Ok(Self {
            path: path.to_path_buf(),
            source_width,
            source_height,
            display: img.to_rgb8(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dimensions of the file on disk, before display resizing.
    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// Display-copy width in pixels.
    pub fn width(&self) -> u32 {
        self.display.width()
    }

    /// Display-copy height in pixels.
    pub fn height(&self) -> u32 {
        self.display.height()
    }

    pub fn display(&self) -> &RgbImage {
        &self.display
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Bounds-checked pixel read in display coordinates. Every sampling
    /// path goes through here; nothing ever indexes the buffer directly.
    pub fn sample(&self, x: u32, y: u32) -> Result<Color, SampleError> {
        if !self.in_bounds(x, y) {
            return Err(SampleError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(Color::from(*self.display.get_pixel(x, y)))
    }
}
