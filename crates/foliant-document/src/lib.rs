// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// foliant-document — The document engine behind Foliant merges.
//
// Provides the engine contract (lifecycle, foreign-format conversion), native
// PDF reading, page import into a combined output document, sheet layout, and
// the in-process converters for images and plain text.

pub mod convert;
pub mod engine;
pub mod image;
pub mod layout;
pub mod pdf;

// Re-export the primary types so callers can use `foliant_document::OutputDocument` etc.
pub use convert::{ConversionRoute, DocumentConverter};
pub use engine::{BuiltinEngine, DocumentEngine, EngineLifecycle, EngineSession, ForeignConverter};
pub use image::processor::ImageProcessor;
pub use layout::{Placement, Rect, SheetLayout};
pub use pdf::{ImportedPage, NativeDocument, OutputDocument, PdfWriter, SavedOutput, SheetPage, SourcePage};
