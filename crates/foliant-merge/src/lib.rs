// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// foliant-merge — Batch merge orchestration.
//
// Scans an input directory, normalises every file through the document engine,
// imposes the pages onto fixed sheets, and saves one combined document. Failures
// on individual files are recorded and skipped; only run-level failures abort.

pub mod integrity;
pub mod orchestrator;
pub mod report;
pub mod scan;
pub mod scratch;

pub use orchestrator::{MergeOrchestrator, RunStage};
pub use report::{FileReport, RunReport, SkipReason};
pub use scan::scan_directory;
pub use scratch::ScratchDir;
