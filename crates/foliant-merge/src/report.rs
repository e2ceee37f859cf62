// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run report — what a merge run did with each file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use foliant_core::error::{FoliantError, Result};
use foliant_core::types::{DocumentKind, InputFile, RunId};
use serde::{Deserialize, Serialize};

/// Why a file contributed no pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    /// Stable error code, e.g. `password_required`.
    pub code: String,
    pub message: String,
}

impl From<&FoliantError> for SkipReason {
    fn from(err: &FoliantError) -> Self {
        Self {
            code: err.code().to_owned(),
            message: err.to_string(),
        }
    }
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// Source pages imported.
    pub pages: usize,
    /// Output sheets produced from those pages.
    pub sheets: usize,
    pub skipped: Option<SkipReason>,
}

impl FileReport {
    pub fn merged(file: &InputFile, pages: usize, sheets: usize) -> Self {
        Self {
            path: file.path.clone(),
            kind: file.kind,
            pages,
            sheets,
            skipped: None,
        }
    }

    pub fn skipped(file: &InputFile, err: &FoliantError) -> Self {
        Self {
            path: file.path.clone(),
            kind: file.kind,
            pages: 0,
            sheets: 0,
            skipped: Some(SkipReason::from(err)),
        }
    }

    pub fn is_merged(&self) -> bool {
        self.skipped.is_none()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output_path: PathBuf,
    /// SHA-256 of the saved output.
    pub output_sha256: String,
    /// Pages in the output document.
    pub sheets: usize,
    /// Source pages merged across all files.
    pub source_pages: usize,
    /// One entry per scanned file, in enumeration order.
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn merged_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.is_merged())
    }

    pub fn skipped_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_merged())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json_pretty()?)?;
        Ok(())
    }
}
