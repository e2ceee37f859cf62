// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Foreign-format conversion to native PDF.
//
// Each document kind maps to a single route. Raster images and plain text are
// rendered in-process; everything else needs an external engine.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use foliant_core::error::{FoliantError, Result};
use foliant_core::types::{DocumentKind, InputFile, SheetSize};

use crate::image::processor::ImageProcessor;
use crate::pdf::writer::PdfWriter;

/// How a document kind reaches native form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionRoute {
    /// Decoded and embedded as a single-page image.
    Raster,
    /// Typeset as paginated text.
    Text,
    /// No in-process route exists.
    Unavailable,
}

/// The route for a given kind.
///
/// Native documents are opened directly by the pipeline and never converted.
pub fn route_for(kind: DocumentKind) -> ConversionRoute {
    match kind {
        DocumentKind::Image => ConversionRoute::Raster,
        DocumentKind::Text => ConversionRoute::Text,
        DocumentKind::Native
        | DocumentKind::Office
        | DocumentKind::Markup
        | DocumentKind::Unknown => ConversionRoute::Unavailable,
    }
}

/// Document converter with fixed page settings.
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    text_page: SheetSize,
    image_dpi: f32,
}

impl DocumentConverter {
    pub fn new(text_page: SheetSize, image_dpi: f32) -> Self {
        Self {
            text_page,
            image_dpi,
        }
    }

    /// Convert `file` into a PDF written at `dest`.
    ///
    /// Decode and render failures are reported as
    /// [`FoliantError::FileConversionFailed`]; kinds without a route as
    /// [`FoliantError::UnsupportedFormat`].
    #[instrument(skip_all, fields(file = %file.display_name(), kind = file.kind.label()))]
    pub fn convert_file(&self, file: &InputFile, dest: &Path) -> Result<()> {
        let route = route_for(file.kind);
        debug!(?route, dest = %dest.display(), "converting");

        let outcome = match route {
            ConversionRoute::Raster => self.convert_image(&file.path, dest),
            ConversionRoute::Text => self.convert_text(&file.path, dest),
            ConversionRoute::Unavailable => {
                warn!("no conversion route");
                return Err(FoliantError::UnsupportedFormat {
                    file: file.path.clone(),
                    format: format_name(&file.path),
                });
            }
        };

        outcome.map_err(|err| match err {
            FoliantError::FileConversionFailed { .. } => err,
            other => FoliantError::FileConversionFailed {
                file: file.path.clone(),
                reason: other.to_string(),
            },
        })?;

        info!("converted to native form");
        Ok(())
    }

    fn convert_image(&self, source: &Path, dest: &Path) -> Result<()> {
        let raster = ImageProcessor::open(source)?.into_rgb_raster();
        let writer = PdfWriter::new(self.text_page);
        writer.write_image_to_file(&raster, self.image_dpi, dest)
    }

    fn convert_text(&self, source: &Path, dest: &Path) -> Result<()> {
        let bytes = std::fs::read(source)?;
        let text = String::from_utf8_lossy(&bytes);
        let mut writer = PdfWriter::new(self.text_page);
        if let Some(stem) = source.file_stem() {
            writer.set_title(stem.to_string_lossy());
        }
        writer.write_text_to_file(&text, dest)
    }
}

/// The file extension, or "unknown" when there is none.
fn format_name(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| "unknown".into())
}
