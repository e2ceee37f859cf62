// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-run scratch storage for normalised files, backed by `tempfile`.

use std::path::{Path, PathBuf};

use foliant_core::error::Result;
use foliant_core::types::RunId;
use tempfile::TempDir;
use tracing::debug;

/// A uniquely named directory that exists for the lifetime of one run.
///
/// Removed by [`ScratchDir::cleanup`] or, failing that, on drop.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `<root>/foliant-<run_id>-<random>`.
    pub fn create(root: &Path, run_id: RunId) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let prefix = format!("foliant-{run_id}-");
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?;
        debug!(path = %dir.path().display(), "Scratch directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Location for a file inside the scratch directory.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory and everything in it, reporting any failure.
    pub fn cleanup(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "Scratch directory removed");
        Ok(())
    }
}
