// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge configuration, persisted as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FoliantError, Result};
use crate::types::{Imposition, Orientation, PaperSize, SaveOptions, SheetSize};

/// Settings for a merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Target sheet paper size.
    pub paper_size: PaperSize,
    /// Target sheet orientation.
    pub orientation: Orientation,
    /// Source pages per output sheet.
    pub imposition: Imposition,
    /// How the output document is serialised.
    pub save: SaveOptions,
    /// Parent of the per-run scratch directory (system temp dir when unset).
    pub scratch_root: Option<PathBuf>,
    /// Optional allow-list of extensions, without the dot. `None` accepts all files.
    pub extensions: Option<Vec<String>>,
    /// Include dot-files in the directory scan.
    pub include_hidden: bool,
    /// Resolution used to size pages for converted raster images.
    pub image_dpi: f32,
    /// Licence key handed to the document engine on initialisation.
    pub license_key: Option<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::Letter,
            orientation: Orientation::Portrait,
            imposition: Imposition::OneUp,
            save: SaveOptions::default(),
            scratch_root: None,
            extensions: None,
            include_hidden: false,
            image_dpi: 72.0,
            license_key: None,
        }
    }
}

impl MergeConfig {
    /// Two source pages per landscape A3 sheet.
    pub fn booklet() -> Self {
        Self {
            paper_size: PaperSize::A3,
            orientation: Orientation::Landscape,
            imposition: Imposition::TwoUp,
            ..Self::default()
        }
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json_pretty()?)?;
        Ok(())
    }

    /// Output sheet dimensions.
    pub fn sheet_size(&self) -> SheetSize {
        SheetSize::new(self.paper_size, self.orientation)
    }

    /// Scratch parent directory, resolved.
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Whether a file extension passes the allow-list.
    pub fn accepts_extension(&self, ext: Option<&str>) -> bool {
        match (&self.extensions, ext) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(allowed), Some(ext)) => allowed
                .iter()
                .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.image_dpi > 0.0) {
            return Err(FoliantError::Config(format!(
                "image_dpi must be positive, got {}",
                self.image_dpi
            )));
        }
        let (w, h) = self.paper_size.dimensions_pt();
        if !(w > 0.0 && h > 0.0) {
            return Err(FoliantError::Config(format!(
                "paper size must be positive, got {w} x {h}"
            )));
        }
        Ok(())
    }
}
