// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open native documents, clear their security handler, and list
// their pages with resolved geometry, using the `lopdf` crate.

use std::path::{Path, PathBuf};

use foliant_core::error::FoliantError;
use lopdf::encryption::DecryptionError;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

use crate::layout::Rect;

/// Bound on /Parent hops, so a cyclic page tree cannot loop forever.
const MAX_TREE_DEPTH: usize = 32;

/// One page of a native document, in document order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourcePage {
    /// 1-indexed page number.
    pub number: u32,
    pub object_id: ObjectId,
    /// CropBox when present, else MediaBox, resolved through the page tree.
    pub bounds: Rect,
}

/// An opened native (PDF) document.
///
/// Exclusively owned by the pipeline step that opened it; dropped once its
/// pages have been imported.
#[derive(Debug)]
pub struct NativeDocument {
    document: Document,
    source_path: Option<PathBuf>,
}

impl NativeDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FoliantError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| load_error(path_ref, err))?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.to_path_buf()),
        })
    }

    /// Create a document from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, FoliantError> {
        let document =
            Document::load_mem(data).map_err(|err| load_error(Path::new("<memory>"), err))?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    /// Wrap an in-memory lopdf document.
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            source_path: None,
        }
    }

    // -- Security -------------------------------------------------------------

    /// Prepare the document's security handler.
    ///
    /// Unprotected documents pass straight through, as do documents the loader
    /// already decrypted. Other encrypted documents are tried with the empty
    /// user password; anything stronger fails with
    /// [`FoliantError::PasswordRequired`] since no password is ever supplied.
    pub fn init_security_handler(&mut self) -> Result<(), FoliantError> {
        if !self.document.is_encrypted() {
            return Ok(());
        }
        if self.document.encryption_state.is_some() {
            debug!("PDF already decrypted on load");
            return Ok(());
        }
        match self.document.decrypt("") {
            Ok(()) => {
                debug!("Opened encrypted PDF with empty user password");
                Ok(())
            }
            Err(err) => {
                debug!(%err, "Empty password rejected");
                Err(FoliantError::PasswordRequired(self.display_path()))
            }
        }
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    /// All pages in document order with their resolved bounds.
    pub fn pages(&self) -> Vec<SourcePage> {
        // `get_pages` is keyed by 1-indexed page number, so iteration is ordered.
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, object_id)| SourcePage {
                number,
                object_id,
                bounds: self.page_bounds(object_id),
            })
            .collect()
    }

    /// Look up a page attribute on the page itself or the nearest ancestor.
    pub(crate) fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.document.get_object(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = self.resolve(current).as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
            current = self.document.get_object(parent).ok()?;
        }
        None
    }

    /// Follow a single level of indirection.
    pub(crate) fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.document.get_object(*id).unwrap_or(object),
            other => other,
        }
    }

    fn page_bounds(&self, page_id: ObjectId) -> Rect {
        ["CropBox", "MediaBox"]
            .iter()
            .filter_map(|key| self.inherited_attribute(page_id, key.as_bytes()))
            .filter_map(|obj| self.box_rect(obj))
            .next()
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 612.0, 792.0))
    }

    fn box_rect(&self, object: &Object) -> Option<Rect> {
        let arr = self.resolve(object).as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        let values: Vec<f32> = arr
            .iter()
            .filter_map(|o| number(self.resolve(o)))
            .collect();
        if values.len() != 4 {
            return None;
        }
        let rect = Rect::from_corners(values[0], values[1], values[2], values[3]);
        (rect.width > 0.0 && rect.height > 0.0).then_some(rect)
    }

    fn display_path(&self) -> PathBuf {
        self.source_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("<memory>"))
    }
}

/// Numeric value of an Integer or Real object.
pub(crate) fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn load_error(path: &Path, err: lopdf::Error) -> FoliantError {
    match err {
        lopdf::Error::Decryption(DecryptionError::IncorrectPassword)
        | lopdf::Error::UnsupportedSecurityHandler(_) => {
            FoliantError::PasswordRequired(path.to_path_buf())
        }
        other => FoliantError::DocumentUnreadable {
            file: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}
