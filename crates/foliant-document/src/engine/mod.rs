// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document engine — the collaborator that turns arbitrary input files into
// native documents. Injected into merge runs rather than reached globally.

pub mod builtin;
pub mod session;

use std::path::Path;

use foliant_core::error::Result;
use foliant_core::types::InputFile;

pub use builtin::BuiltinEngine;
pub use session::EngineSession;

/// Process-level setup and teardown of an engine.
pub trait EngineLifecycle {
    /// Bring the engine up. Called once, before any conversion.
    fn initialize(&mut self, license_key: Option<&str>) -> Result<()>;

    /// Release engine resources. Further conversions must not be attempted.
    fn terminate(&mut self) -> Result<()>;

    /// Whether the engine can currently serve requests.
    fn is_initialized(&self) -> bool;
}

/// Conversion of a foreign-format file into a native document on disk.
pub trait ForeignConverter {
    /// Write a native rendition of `file` to `dest`.
    ///
    /// Failures are per-file: `FileConversionFailed` or `UnsupportedFormat`.
    fn convert_to_native(&self, file: &InputFile, dest: &Path) -> Result<()>;
}

/// A complete document engine.
pub trait DocumentEngine: EngineLifecycle + ForeignConverter {
    fn engine_name(&self) -> &str;
}
