// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode raster files and flatten them to 8-bit RGB ready to
// be embedded as a PDF image XObject.

use std::path::Path;

use foliant_core::error::FoliantError;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, info, instrument};

/// Packed 8-bit RGB pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbRaster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A single decoded image.
#[derive(Debug)]
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path. The format is sniffed from content.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FoliantError> {
        let data = std::fs::read(path.as_ref())?;
        let img = image::load_from_memory(&data).map_err(|err| {
            FoliantError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, FoliantError> {
        let img = image::load_from_memory(data).map_err(|err| {
            FoliantError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Output ---------------------------------------------------------------

    /// Flatten to RGB, compositing any alpha channel over white paper.
    pub fn into_rgb_raster(self) -> RgbRaster {
        let width = self.image.width();
        let height = self.image.height();

        let rgb: RgbImage = if self.image.color().has_alpha() {
            let rgba = self.image.to_rgba8();
            RgbImage::from_fn(width, height, |x, y| {
                let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
                let over_white = |channel: u8| -> u8 {
                    let alpha = a as u32;
                    ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
                };
                Rgb([over_white(r), over_white(g), over_white(b)])
            })
        } else {
            self.image.to_rgb8()
        };

        RgbRaster {
            width,
            height,
            pixels: rgb.into_raw(),
        }
    }
}
