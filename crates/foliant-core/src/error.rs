// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Foliant.
//
// Errors fall into two scopes. File-scope errors concern a single input and are
// recovered by skipping that input; run-scope errors abort the whole merge.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Foliant operations.
#[derive(Debug, Error)]
pub enum FoliantError {
    // -- Run errors --
    #[error("input directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("document engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("failed to write output {}: {reason}", .path.display())]
    OutputWriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- File errors --
    #[error("conversion of {} failed: {reason}", .file.display())]
    FileConversionFailed { file: PathBuf, reason: String },

    #[error("unsupported format for {}: {format}", .file.display())]
    UnsupportedFormat { file: PathBuf, format: String },

    #[error("{} is password protected", .0.display())]
    PasswordRequired(PathBuf),

    #[error("cannot read document {}: {reason}", .file.display())]
    DocumentUnreadable { file: PathBuf, reason: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whether an error is confined to one input file or ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Log, skip the file, keep merging.
    File,
    /// Abort the run and surface the error to the caller.
    Run,
}

impl FoliantError {
    /// Classify this error for the orchestrator's skip-or-abort decision.
    pub fn scope(&self) -> ErrorScope {
        match self {
            FoliantError::FileConversionFailed { .. }
            | FoliantError::UnsupportedFormat { .. }
            | FoliantError::PasswordRequired(_)
            | FoliantError::DocumentUnreadable { .. }
            | FoliantError::PdfError(_)
            | FoliantError::ImageError(_) => ErrorScope::File,

            FoliantError::DirectoryNotFound(_)
            | FoliantError::EngineUnavailable(_)
            | FoliantError::OutputWriteFailed { .. }
            | FoliantError::Config(_)
            | FoliantError::Io(_)
            | FoliantError::Serialization(_) => ErrorScope::Run,
        }
    }

    /// Stable identifier used in run reports.
    pub fn code(&self) -> &'static str {
        match self {
            FoliantError::DirectoryNotFound(_) => "directory_not_found",
            FoliantError::EngineUnavailable(_) => "engine_unavailable",
            FoliantError::OutputWriteFailed { .. } => "output_write_failed",
            FoliantError::Config(_) => "config",
            FoliantError::FileConversionFailed { .. } => "file_conversion_failed",
            FoliantError::UnsupportedFormat { .. } => "unsupported_format",
            FoliantError::PasswordRequired(_) => "password_required",
            FoliantError::DocumentUnreadable { .. } => "document_unreadable",
            FoliantError::PdfError(_) => "pdf_error",
            FoliantError::ImageError(_) => "image_error",
            FoliantError::Io(_) => "io",
            FoliantError::Serialization(_) => "serialization",
        }
    }

    /// True when the orchestrator should skip the file and continue.
    pub fn is_recoverable(&self) -> bool {
        self.scope() == ErrorScope::File
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FoliantError>;
