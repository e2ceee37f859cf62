// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process document engine backed by `DocumentConverter`.

use std::path::Path;

use foliant_core::config::MergeConfig;
use foliant_core::error::{FoliantError, Result};
use foliant_core::types::{InputFile, SheetSize};
use tracing::debug;

use super::{DocumentEngine, EngineLifecycle, ForeignConverter};
use crate::convert::DocumentConverter;

/// Converts images and plain text without any external tooling.
#[derive(Debug, Clone)]
pub struct BuiltinEngine {
    converter: DocumentConverter,
    initialized: bool,
}

impl BuiltinEngine {
    pub fn new(text_page: SheetSize, image_dpi: f32) -> Self {
        Self {
            converter: DocumentConverter::new(text_page, image_dpi),
            initialized: false,
        }
    }

    /// Text pages on the configured paper; images at the configured DPI.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.sheet_size(), config.image_dpi)
    }
}

impl Default for BuiltinEngine {
    fn default() -> Self {
        Self::from_config(&MergeConfig::default())
    }
}

impl EngineLifecycle for BuiltinEngine {
    fn initialize(&mut self, license_key: Option<&str>) -> Result<()> {
        // No licence is needed in-process; a key is accepted and ignored.
        debug!(licensed = license_key.is_some(), "builtin engine ready");
        self.initialized = true;
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        self.initialized = false;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl ForeignConverter for BuiltinEngine {
    fn convert_to_native(&self, file: &InputFile, dest: &Path) -> Result<()> {
        if !self.initialized {
            return Err(FoliantError::EngineUnavailable(
                "builtin engine used before initialisation".into(),
            ));
        }
        self.converter.convert_file(file, dest)
    }
}

impl DocumentEngine for BuiltinEngine {
    fn engine_name(&self) -> &str {
        "builtin"
    }
}
