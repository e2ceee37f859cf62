// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end merge runs against real files in temporary directories.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use foliant_core::error::{FoliantError, Result};
use foliant_core::{InputFile, MergeConfig, Orientation, PaperSize, SheetSize};
use foliant_document::engine::{DocumentEngine, EngineLifecycle, EngineSession, ForeignConverter};
use foliant_merge::{MergeOrchestrator, RunStage, integrity};

use common::*;

#[test]
fn pdf_and_image_become_three_letter_pages() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 2, (595, 842));
    write_png(input.path(), "b.png", 300, 200);
    let output = work.path().join("merged.pdf");

    let session = session();
    let mut orchestrator = MergeOrchestrator::new(&session, config_in(work.path()));
    let report = orchestrator.run(input.path(), &output).expect("run");

    assert_eq!(orchestrator.stage(), RunStage::Done);
    assert_eq!(report.sheets, 3);
    assert_eq!(report.source_pages, 3);
    assert_eq!(report.skipped_files().count(), 0);

    let doc = lopdf::Document::load(&output).expect("load output");
    assert_eq!(doc.get_pages().len(), 3);

    let labels = page_labels(&output);
    assert!(labels[0].contains("A-Page-1"));
    assert!(labels[1].contains("A-Page-2"));
    assert!(labels[2].contains("Do"), "image page draws its XObject");

    // A4 onto letter is width-bound.
    let cm = &placements(&output, 1)[0];
    let expected = (612.0f32 / 595.0).min(792.0 / 842.0);
    assert!((cm[0] - expected).abs() < 1e-2);
    assert_eq!(cm[0], cm[3]);
}

#[test]
fn empty_directory_saves_empty_document() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    let output = work.path().join("empty.pdf");

    let session = session();
    let report = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    assert_eq!(report.sheets, 0);
    assert!(report.files.is_empty());
    let doc = lopdf::Document::load(&output).expect("load output");
    assert_eq!(doc.get_pages().len(), 0);
}

#[test]
fn corrupt_file_is_skipped_and_reported() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "1-first.pdf", "First", 1, (612, 792));
    std::fs::write(input.path().join("2-corrupt.pdf"), b"definitely not a pdf").expect("write");
    write_pdf(input.path(), "3-second.pdf", "Second", 2, (612, 792));
    write_png(input.path(), "4-third.png", 10, 10);
    let output = work.path().join("merged.pdf");

    let session = session();
    let report = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    assert_eq!(report.files.len(), 4);
    assert_eq!(report.sheets, 4);
    let skipped: Vec<_> = report.skipped_files().collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].path.ends_with("2-corrupt.pdf"));
    assert_eq!(
        skipped[0].skipped.as_ref().map(|s| s.code.as_str()),
        Some("document_unreadable")
    );

    let labels = page_labels(&output);
    assert!(labels[0].contains("First-Page-1"));
    assert!(labels[1].contains("Second-Page-1"));
    assert!(labels[2].contains("Second-Page-2"));
}

#[test]
fn password_protected_file_is_skipped() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "1-open.pdf", "Open", 1, (612, 792));
    write_encrypted_pdf(input.path(), "2-locked.pdf", "Locked", "hunter2");
    write_pdf(input.path(), "3-after.pdf", "After", 1, (612, 792));
    let output = work.path().join("merged.pdf");

    let session = session();
    let report = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    assert_eq!(report.sheets, 2);
    let skipped: Vec<_> = report.skipped_files().collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].path.ends_with("2-locked.pdf"));
    assert_eq!(
        skipped[0].skipped.as_ref().map(|s| s.code.as_str()),
        Some("password_required")
    );

    let labels = page_labels(&output);
    assert!(labels[0].contains("Open-Page-1"));
    assert!(labels[1].contains("After-Page-1"));
}

#[test]
fn empty_password_file_merges_intact() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "1-plain.pdf", "Plain", 1, (612, 792));
    write_encrypted_pdf(input.path(), "2-sealed.pdf", "Sealed", "");
    let output = work.path().join("merged.pdf");

    let session = session();
    let report = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    assert_eq!(report.skipped_files().count(), 0);
    assert_eq!(report.sheets, 2);

    let output_doc = lopdf::Document::load(&output).expect("load output");
    assert!(!output_doc.is_encrypted());
    let labels = page_labels(&output);
    assert!(labels[0].contains("Plain-Page-1"));
    assert!(labels[1].contains("Sealed-Page-1"), "got {:?}", labels[1]);
}

#[test]
fn corrupt_image_is_conversion_failure() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 1, (612, 792));
    std::fs::write(input.path().join("b.png"), b"\x89PNG but truncated").expect("write");
    write_png(input.path(), "c.png", 16, 16);
    let output = work.path().join("merged.pdf");

    let session = session();
    let report = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    assert_eq!(report.files.len(), 3);
    assert_eq!(report.sheets, 2);
    let reason = report.files[1].skipped.as_ref().expect("skipped");
    assert_eq!(reason.code, "file_conversion_failed");
    assert!(report.files[2].is_merged());
}

#[test]
fn unsupported_format_is_skipped() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 1, (612, 792));
    std::fs::write(input.path().join("b.docx"), b"PK\x03\x04").expect("write");
    let output = work.path().join("merged.pdf");

    let session = session();
    let report = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    assert_eq!(report.sheets, 1);
    let reason = report.files[1].skipped.as_ref().expect("skipped");
    assert_eq!(reason.code, "unsupported_format");
}

#[test]
fn page_order_follows_file_names() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "c.pdf", "C", 1, (612, 792));
    write_pdf(input.path(), "a.pdf", "A", 2, (612, 792));
    write_pdf(input.path(), "b.pdf", "B", 1, (612, 792));
    let output = work.path().join("merged.pdf");

    let session = session();
    MergeOrchestrator::new(&session, config_in(work.path()))
        .run(input.path(), &output)
        .expect("run");

    let labels = page_labels(&output);
    let order: Vec<&str> = ["A-Page-1", "A-Page-2", "B-Page-1", "C-Page-1"].to_vec();
    assert_eq!(labels.len(), order.len());
    for (label, expected) in labels.iter().zip(order) {
        assert!(label.contains(expected), "{label} should contain {expected}");
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 3, (595, 842));
    write_png(input.path(), "b.png", 64, 48);
    let output = work.path().join("merged.pdf");

    let session = session();
    let mut orchestrator = MergeOrchestrator::new(&session, config_in(work.path()));
    let first = orchestrator.run(input.path(), &output).expect("first run");
    let first_bytes = std::fs::read(&output).expect("read");
    let second = orchestrator.run(input.path(), &output).expect("second run");
    let second_bytes = std::fs::read(&output).expect("read");

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.output_sha256, second.output_sha256);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(integrity::hash_bytes(&first_bytes), first.output_sha256);
}

#[test]
fn scratch_is_removed_after_success() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    let scratch_root = work.path().join("scratch");
    write_png(input.path(), "a.png", 8, 8);

    let session = session();
    let config = MergeConfig {
        scratch_root: Some(scratch_root.clone()),
        ..MergeConfig::default()
    };
    MergeOrchestrator::new(&session, config)
        .run(input.path(), work.path().join("out.pdf"))
        .expect("run");

    assert!(leftover_scratch(&scratch_root).is_empty());
}

#[test]
fn scratch_is_removed_after_failure() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_png(input.path(), "a.png", 8, 8);
    let unwritable = work.path().join("missing").join("out.pdf");

    let session = session();
    let mut orchestrator = MergeOrchestrator::new(&session, config_in(work.path()));
    let err = orchestrator.run(input.path(), &unwritable).unwrap_err();

    assert!(matches!(err, FoliantError::OutputWriteFailed { .. }));
    assert_eq!(orchestrator.stage(), RunStage::Failed);
    assert!(leftover_scratch(work.path()).is_empty());
}

#[test]
fn missing_input_directory_aborts() {
    let work = tempfile::tempdir().expect("work dir");
    let session = session();
    let err = MergeOrchestrator::new(&session, config_in(work.path()))
        .run(work.path().join("absent"), work.path().join("out.pdf"))
        .unwrap_err();
    assert!(matches!(err, FoliantError::DirectoryNotFound(_)));
    assert!(!work.path().join("out.pdf").exists());
}

#[test]
fn output_inside_input_directory_is_not_remerged() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 2, (612, 792));
    let output = input.path().join("merged.pdf");

    let session = session();
    let mut orchestrator = MergeOrchestrator::new(&session, config_in(work.path()));
    orchestrator.run(input.path(), &output).expect("first run");
    let report = orchestrator.run(input.path(), &output).expect("second run");

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.sheets, 2);
}

#[test]
fn two_up_pairs_pages_within_a_file() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 3, (595, 842));
    write_pdf(input.path(), "b.pdf", "B", 1, (595, 842));
    let output = work.path().join("booklet.pdf");

    let session = session();
    let config = MergeConfig {
        scratch_root: Some(work.path().to_path_buf()),
        ..MergeConfig::booklet()
    };
    let report = MergeOrchestrator::new(&session, config)
        .run(input.path(), &output)
        .expect("run");

    // a: 2 sheets (pair + odd page), b: 1 sheet.
    assert_eq!(report.sheets, 3);
    assert_eq!(report.source_pages, 4);
    assert_eq!(report.files[0].sheets, 2);

    let half = SheetSize::new(PaperSize::A3, Orientation::Landscape).width / 2.0;
    let first = placements(&output, 1);
    assert_eq!(first.len(), 2);
    assert!(first[0][4].abs() < 1e-3);
    assert!((first[1][4] - half).abs() < 1e-2);
    assert_eq!(placements(&output, 2).len(), 1);
    assert_eq!(placements(&output, 3).len(), 1);
}

/// An engine that can be switched off from outside.
struct Switchable {
    ready: Arc<AtomicBool>,
}

impl EngineLifecycle for Switchable {
    fn initialize(&mut self, _license_key: Option<&str>) -> Result<()> {
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        self.ready.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl ForeignConverter for Switchable {
    fn convert_to_native(&self, file: &InputFile, _dest: &Path) -> Result<()> {
        Err(FoliantError::UnsupportedFormat {
            file: file.path.clone(),
            format: "any".into(),
        })
    }
}

impl DocumentEngine for Switchable {
    fn engine_name(&self) -> &str {
        "switchable"
    }
}

#[test]
fn unavailable_engine_aborts_run() {
    let input = tempfile::tempdir().expect("input dir");
    let work = tempfile::tempdir().expect("work dir");
    write_pdf(input.path(), "a.pdf", "A", 1, (612, 792));

    let ready = Arc::new(AtomicBool::new(false));
    let session = EngineSession::start(
        Switchable {
            ready: ready.clone(),
        },
        Some("licence"),
    )
    .expect("start");
    ready.store(false, Ordering::SeqCst);

    let mut orchestrator = MergeOrchestrator::new(&session, config_in(work.path()));
    let err = orchestrator
        .run(input.path(), work.path().join("out.pdf"))
        .unwrap_err();
    assert!(matches!(err, FoliantError::EngineUnavailable(_)));
    assert_eq!(orchestrator.stage(), RunStage::Failed);
}
