// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Foliant merge pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad family of an input file, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Already a page document (PDF); used as-is.
    Native,
    /// Raster image (PNG, JPEG, GIF, BMP, TIFF, WebP).
    Image,
    /// Plain text.
    Text,
    /// Word-processor, spreadsheet, or presentation file.
    Office,
    /// HTML, XML, or similar markup.
    Markup,
    /// Anything we cannot classify.
    Unknown,
}

impl DocumentKind {
    /// Infer the kind from a file extension (case-insensitive, no leading dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Native,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" => Self::Image,
            "txt" | "text" | "log" | "csv" | "md" => Self::Text,
            "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "odt" | "ods" | "odp" | "rtf" => {
                Self::Office
            }
            "html" | "htm" | "xhtml" | "xml" | "svg" | "xps" => Self::Markup,
            _ => Self::Unknown,
        }
    }

    /// Infer the kind from a path. Files without an extension are `Unknown`.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Whether the file can be opened directly without conversion.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Short lowercase label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Native => "pdf",
            Self::Image => "image",
            Self::Text => "text",
            Self::Office => "office",
            Self::Markup => "markup",
            Self::Unknown => "unknown",
        }
    }
}

/// A file discovered by the directory scan. Consumed once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    /// Zero-based position in enumeration order.
    pub index: usize,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl InputFile {
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = DocumentKind::from_path(&path);
        Self { index, path, kind }
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Name of the normalised copy in scratch storage.
    ///
    /// Depends only on the enumeration index and the file stem, so two files
    /// with the same stem never collide.
    pub fn scratch_name(&self) -> String {
        let stem: String = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{:04}-{}.pdf", self.index, stem)
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_pt: f32, height_pt: f32 },
}

impl PaperSize {
    /// Portrait dimensions in PDF points (width, height). 1pt = 1/72 inch.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            Self::A3 => (841.89, 1190.55),
            Self::A4 => (595.28, 841.89),
            Self::A5 => (419.53, 595.28),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
            Self::Tabloid => (792.0, 1224.0),
            Self::Custom {
                width_pt,
                height_pt,
            } => (*width_pt, *height_pt),
        }
    }

    /// Parse a paper name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a3" => Some(Self::A3),
            "a4" => Some(Self::A4),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" | "ledger" => Some(Self::Tabloid),
            _ => None,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Fixed output sheet size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetSize {
    pub width: f32,
    pub height: f32,
}

impl SheetSize {
    pub fn new(paper: PaperSize, orientation: Orientation) -> Self {
        let (w, h) = paper.dimensions_pt();
        match orientation {
            Orientation::Portrait => Self {
                width: w,
                height: h,
            },
            Orientation::Landscape => Self {
                width: h,
                height: w,
            },
        }
    }

    /// US Letter portrait, 612 x 792.
    pub fn letter() -> Self {
        Self::new(PaperSize::Letter, Orientation::Portrait)
    }
}

/// How many source pages share one output sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Imposition {
    /// One source page per sheet, scaled to fit.
    #[default]
    OneUp,
    /// Two source pages side by side, each scaled into half the sheet.
    TwoUp,
}

impl Imposition {
    pub fn pages_per_sheet(&self) -> usize {
        match self {
            Self::OneUp => 1,
            Self::TwoUp => 2,
        }
    }
}

/// Serialisation options for the final output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Dense sequential object layout for front-to-back reading.
    pub linearized: bool,
    /// Flate-compress streams before writing.
    pub compress: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            linearized: true,
            compress: true,
        }
    }
}
