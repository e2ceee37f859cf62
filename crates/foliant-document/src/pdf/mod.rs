// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading sources, building the merged output, and creating PDFs
// from text and images.

pub mod output;
pub mod reader;
pub mod writer;

pub use output::{ImportedPage, OutputDocument, SavedOutput, SheetPage};
pub use reader::{NativeDocument, SourcePage};
pub use writer::PdfWriter;
