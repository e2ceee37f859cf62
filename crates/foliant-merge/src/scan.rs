// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory scan — the ordered list of files a run will merge.

use std::path::{Path, PathBuf};

use foliant_core::config::MergeConfig;
use foliant_core::error::{FoliantError, Result};
use foliant_core::types::InputFile;
use tracing::{debug, instrument};

/// List the files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Hidden files and extensions outside
/// the configured allow-list are left out, as is `exclude` (normally the output
/// path, so a previous result is never merged back in).
#[instrument(skip(config))]
pub fn scan_directory(
    dir: &Path,
    config: &MergeConfig,
    exclude: Option<&Path>,
) -> Result<Vec<InputFile>> {
    if !dir.is_dir() {
        return Err(FoliantError::DirectoryNotFound(dir.to_path_buf()));
    }

    let excluded = exclude.map(canonical_or_self);
    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .map(|name| name.to_string_lossy().starts_with('.'))
            .unwrap_or(false);
        if hidden && !config.include_hidden {
            debug!(path = %path.display(), "skipping hidden file");
            continue;
        }
        let ext = path.extension().and_then(|ext| ext.to_str());
        if !config.accepts_extension(ext) {
            debug!(path = %path.display(), "extension not in allow-list");
            continue;
        }
        if excluded.as_deref() == Some(canonical_or_self(&path).as_path()) {
            debug!(path = %path.display(), "skipping output file");
            continue;
        }
        paths.push(path);
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let files: Vec<InputFile> = paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| InputFile::new(index, path))
        .collect();
    debug!(count = files.len(), "scan complete");
    Ok(files)
}

/// Canonical form when the path exists; otherwise an absolute best effort.
fn canonical_or_self(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    // A not-yet-written output: canonicalise its parent instead.
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}
