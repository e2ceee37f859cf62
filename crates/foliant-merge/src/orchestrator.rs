// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge orchestrator — one run from directory scan to saved output.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use foliant_core::config::MergeConfig;
use foliant_core::error::{FoliantError, Result};
use foliant_core::types::{InputFile, RunId};
use foliant_document::engine::{DocumentEngine, EngineSession};
use foliant_document::layout::SheetLayout;
use foliant_document::pdf::{ImportedPage, NativeDocument, OutputDocument, SavedOutput};
use tracing::{debug, error, info, info_span, warn};

use crate::integrity;
use crate::report::{FileReport, RunReport};
use crate::scan::scan_directory;
use crate::scratch::ScratchDir;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Scanning,
    Normalizing,
    Importing,
    Placing,
    Saving,
    Cleanup,
    Done,
    Failed,
}

impl RunStage {
    /// Stages entered once per file rather than once per run.
    fn is_per_file(&self) -> bool {
        matches!(self, Self::Normalizing | Self::Importing | Self::Placing)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Normalizing => "normalizing",
            Self::Importing => "importing",
            Self::Placing => "placing",
            Self::Saving => "saving",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs merges against a shared engine session.
///
/// The session outlives every run; the orchestrator only borrows it.
pub struct MergeOrchestrator<'s, E: DocumentEngine> {
    session: &'s EngineSession<E>,
    config: MergeConfig,
    layout: SheetLayout,
    stage: RunStage,
}

impl<'s, E: DocumentEngine> MergeOrchestrator<'s, E> {
    pub fn new(session: &'s EngineSession<E>, config: MergeConfig) -> Self {
        let layout = SheetLayout::new(config.sheet_size(), config.imposition);
        Self {
            session,
            config,
            layout,
            stage: RunStage::Idle,
        }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Stage reached by the most recent run.
    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Merge every file in `input_dir` into a single document at `output_path`.
    ///
    /// Files that fail individually are skipped and listed in the report. A
    /// run-level failure returns the error; the scratch directory is removed
    /// either way.
    pub fn run(
        &mut self,
        input_dir: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<RunReport> {
        let input_dir = input_dir.as_ref();
        let output_path = output_path.as_ref();
        let run_id = RunId::new();
        let span = info_span!("merge_run", %run_id);
        let _entered = span.enter();

        let started_at = Utc::now();
        self.stage = RunStage::Idle;
        info!(
            input = %input_dir.display(),
            output = %output_path.display(),
            "Merge run started"
        );

        let mut scratch = None;
        let outcome = self.execute(run_id, input_dir, output_path, &mut scratch);

        self.transition(RunStage::Cleanup);
        if let Some(dir) = scratch {
            if let Err(err) = dir.cleanup() {
                warn!(%err, "Scratch directory could not be removed");
            }
        }

        match outcome {
            Ok((saved, files)) => {
                let report = RunReport {
                    run_id,
                    started_at,
                    finished_at: Utc::now(),
                    output_path: saved.path,
                    output_sha256: integrity::hash_bytes(&saved.bytes),
                    sheets: saved.page_count,
                    source_pages: files.iter().map(|f| f.pages).sum(),
                    files,
                };
                self.transition(RunStage::Done);
                info!(
                    sheets = report.sheets,
                    merged = report.merged_files().count(),
                    skipped = report.skipped_files().count(),
                    "Merge run finished"
                );
                Ok(report)
            }
            Err(err) => {
                self.transition(RunStage::Failed);
                error!(code = err.code(), %err, "Merge run failed");
                Err(err)
            }
        }
    }

    fn execute(
        &mut self,
        run_id: RunId,
        input_dir: &Path,
        output_path: &Path,
        scratch: &mut Option<ScratchDir>,
    ) -> Result<(SavedOutput, Vec<FileReport>)> {
        self.config.validate()?;
        self.session.engine()?;

        self.transition(RunStage::Scanning);
        let files = scan_directory(input_dir, &self.config, Some(output_path))?;
        info!(files = files.len(), "Input directory scanned");

        let scratch = scratch.insert(ScratchDir::create(&self.config.scratch_root(), run_id)?);
        let mut output = OutputDocument::new();
        let mut reports = Vec::with_capacity(files.len());

        for file in &files {
            match self.merge_file(file, scratch, &mut output) {
                Ok((pages, sheets)) => {
                    debug!(file = %file.display_name(), pages, sheets, "File merged");
                    reports.push(FileReport::merged(file, pages, sheets));
                }
                Err(err) if err.is_recoverable() => {
                    warn!(
                        file = %file.display_name(),
                        code = err.code(),
                        %err,
                        "Skipping file"
                    );
                    reports.push(FileReport::skipped(file, &err));
                }
                Err(err) => return Err(err),
            }
        }

        self.transition(RunStage::Saving);
        let saved = output.save(output_path, self.config.save)?;
        Ok((saved, reports))
    }

    /// Normalise, import, and place a single file.
    ///
    /// Returns `(source pages, sheets)`. Nothing is appended to `output` unless
    /// every page of the file could be placed.
    fn merge_file(
        &mut self,
        file: &InputFile,
        scratch: &ScratchDir,
        output: &mut OutputDocument,
    ) -> Result<(usize, usize)> {
        self.transition(RunStage::Normalizing);
        let native_path = self.normalize(file, scratch)?;

        let mut document = NativeDocument::open(&native_path).map_err(|err| match err {
            // Report against the input, not the scratch copy.
            FoliantError::PasswordRequired(_) => FoliantError::PasswordRequired(file.path.clone()),
            FoliantError::DocumentUnreadable { reason, .. } => FoliantError::DocumentUnreadable {
                file: file.path.clone(),
                reason,
            },
            other => other,
        })?;
        document
            .init_security_handler()
            .map_err(|_| FoliantError::PasswordRequired(file.path.clone()))?;

        self.transition(RunStage::Importing);
        let pages = document.pages();
        let imported = output.import_pages(&document, &pages)?;
        drop(document);

        self.transition(RunStage::Placing);
        let sheets = self.impose(&imported, output)?;
        Ok((imported.len(), sheets))
    }

    fn normalize(&self, file: &InputFile, scratch: &ScratchDir) -> Result<PathBuf> {
        if file.kind.is_native() {
            return Ok(file.path.clone());
        }
        let dest = scratch.file_path(&file.scratch_name());
        self.session.engine()?.convert_to_native(file, &dest)?;
        Ok(dest)
    }

    /// Lay `pages` onto sheets and append them, pages of one file only.
    fn impose(&self, pages: &[ImportedPage], output: &mut OutputDocument) -> Result<usize> {
        let slots = self.layout.slots();
        let per_sheet = self.layout.slots_per_sheet();
        let mut sheets = Vec::with_capacity(pages.len().div_ceil(per_sheet));

        for group in pages.chunks(per_sheet) {
            let mut sheet = output.create_page(self.layout.sheet);
            for (page, slot) in group.iter().zip(&slots) {
                let placement = self.layout.placement(slot, &page.bounds)?;
                sheet.place(page, placement);
            }
            sheets.push(sheet);
        }

        let count = sheets.len();
        for sheet in sheets {
            output.append_page(sheet)?;
        }
        Ok(count)
    }

    fn transition(&mut self, next: RunStage) {
        if next.is_per_file() {
            debug!(from = %self.stage, to = %next, "stage");
        } else {
            info!(from = %self.stage, to = %next, "stage");
        }
        self.stage = next;
    }
}
