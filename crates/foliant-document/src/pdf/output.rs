// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output document — the single accumulating result of a merge run.
//
// Source pages are imported as Form XObjects: their decoded content plus a deep
// copy of their resources, living in the output's own object space. Sheets are
// then built by drawing those forms under a scale/translate matrix.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use foliant_core::error::FoliantError;
use foliant_core::types::{SaveOptions, SheetSize};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, instrument, warn};

use super::reader::{NativeDocument, SourcePage};
use crate::layout::{Placement, Rect};

/// A source page copied into the output document, ready to be placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportedPage {
    /// 1-indexed page number in the source document.
    pub source_number: u32,
    /// The Form XObject holding the page's content.
    pub form_id: ObjectId,
    /// The source page box, also the form's BBox.
    pub bounds: Rect,
}

/// A blank output sheet being filled with placed pages.
#[derive(Debug, Clone)]
pub struct SheetPage {
    size: SheetSize,
    placements: Vec<(ObjectId, Placement)>,
}

impl SheetPage {
    /// Draw `page` onto this sheet under `placement`.
    pub fn place(&mut self, page: &ImportedPage, placement: Placement) {
        self.placements.push((page.form_id, placement));
    }
}

/// Result of serialising the output document.
#[derive(Debug, Clone)]
pub struct SavedOutput {
    pub path: PathBuf,
    pub page_count: usize,
    /// The exact bytes written to `path`.
    pub bytes: Vec<u8>,
}

/// The combined document under construction.
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    page_count: usize,
}

impl OutputDocument {
    /// Create an empty document: a catalog and a page tree with no kids.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(Vec::new()));
        pages.set("Count", Object::Integer(0));
        document.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = document.add_object(Object::Dictionary(catalog));
        document.trailer.set("Root", Object::Reference(catalog_id));

        Self {
            document,
            pages_id,
            page_count: 0,
        }
    }

    /// Number of sheets appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    // -- Import ---------------------------------------------------------------

    /// Deep-copy `pages` of `source` into this document.
    ///
    /// Objects shared between the pages (fonts, images) are copied once. The
    /// returned pages keep the order of `pages`.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn import_pages(
        &mut self,
        source: &NativeDocument,
        pages: &[SourcePage],
    ) -> Result<Vec<ImportedPage>, FoliantError> {
        let mut importer = ObjectImporter::new(source.document());
        let mut imported = Vec::with_capacity(pages.len());

        for page in pages {
            let content = page_content(source.document(), page)?;

            let resources = match source.inherited_attribute(page.object_id, b"Resources") {
                Some(obj) => importer.import(&mut self.document, obj),
                None => Object::Dictionary(Dictionary::new()),
            };

            let bounds = page.bounds;
            let mut form = Dictionary::new();
            form.set("Type", Object::Name(b"XObject".to_vec()));
            form.set("Subtype", Object::Name(b"Form".to_vec()));
            form.set("FormType", Object::Integer(1));
            form.set(
                "BBox",
                Object::Array(vec![
                    Object::Real(bounds.x),
                    Object::Real(bounds.y),
                    Object::Real(bounds.right()),
                    Object::Real(bounds.top()),
                ]),
            );
            form.set("Resources", resources);
            let form_id = self.document.add_object(Stream::new(form, content));

            imported.push(ImportedPage {
                source_number: page.number,
                form_id,
                bounds,
            });
        }

        debug!(
            imported = imported.len(),
            objects_copied = importer.copied(),
            "Pages imported"
        );
        Ok(imported)
    }

    // -- Sheets ---------------------------------------------------------------

    /// Start a new blank sheet of the given size.
    pub fn create_page(&self, size: SheetSize) -> SheetPage {
        SheetPage {
            size,
            placements: Vec::new(),
        }
    }

    /// Write `sheet` as a page and append it to the page tree.
    pub fn append_page(&mut self, sheet: SheetPage) -> Result<ObjectId, FoliantError> {
        let mut xobjects = Dictionary::new();
        let mut operations = Vec::with_capacity(sheet.placements.len() * 4);

        for (index, (form_id, placement)) in sheet.placements.iter().enumerate() {
            let name = format!("Fm{index}");
            xobjects.set(name.clone(), Object::Reference(*form_id));

            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                placement.matrix().iter().map(|v| Object::Real(*v)).collect(),
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations }.encode().map_err(|err| {
            FoliantError::PdfError(format!("failed to encode sheet content: {}", err))
        })?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(sheet.size.width),
                Object::Real(sheet.size.height),
            ]),
        );
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        let page_id = self.document.add_object(Object::Dictionary(page));

        match self.document.get_object_mut(self.pages_id) {
            Ok(Object::Dictionary(pages)) => {
                match pages.get_mut(b"Kids") {
                    Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
                    _ => {
                        return Err(FoliantError::PdfError(
                            "output page tree has no /Kids array".into(),
                        ));
                    }
                }
                pages.set("Count", Object::Integer(self.page_count as i64 + 1));
            }
            _ => {
                return Err(FoliantError::PdfError(
                    "output page tree is missing".into(),
                ));
            }
        }

        self.page_count += 1;
        Ok(page_id)
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise to `path`, consuming the document.
    ///
    /// Objects no longer reachable from the catalog (forms imported for a file
    /// that was later skipped) are dropped first.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), pages = self.page_count))]
    pub fn save(
        mut self,
        path: impl AsRef<Path>,
        options: SaveOptions,
    ) -> Result<SavedOutput, FoliantError> {
        let path = path.as_ref();
        let write_failed = |reason: String| FoliantError::OutputWriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        let pruned = self.document.prune_objects();
        if options.linearized {
            self.document.renumber_objects();
        }
        if options.compress {
            self.document.compress();
        }

        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|err| write_failed(err.to_string()))?;
        std::fs::write(path, &bytes).map_err(|err| write_failed(err.to_string()))?;

        info!(
            pruned = pruned.len(),
            bytes = bytes.len(),
            "Output document saved"
        );

        Ok(SavedOutput {
            path: path.to_path_buf(),
            page_count: self.page_count,
            bytes,
        })
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded content of every content stream of `page`, in order.
fn page_content(document: &Document, page: &SourcePage) -> Result<Vec<u8>, FoliantError> {
    let mut content = Vec::new();
    for stream_id in document.get_page_contents(page.object_id) {
        let stream = document
            .get_object(stream_id)
            .and_then(Object::as_stream)
            .map_err(|err| {
                FoliantError::PdfError(format!(
                    "page {} content {:?} unreadable: {}",
                    page.number, stream_id, err
                ))
            })?;
        let data = if stream.dict.has(b"Filter") {
            stream.decompressed_content().map_err(|err| {
                FoliantError::PdfError(format!(
                    "page {} content cannot be decoded: {}",
                    page.number, err
                ))
            })?
        } else {
            stream.content.clone()
        };
        if !content.is_empty() {
            content.push(b'\n');
        }
        content.extend_from_slice(&data);
    }
    Ok(content)
}

/// Copies objects from one document into another, following references.
///
/// Each source object is copied at most once, which also makes reference
/// cycles terminate. `/Parent` links are not followed so a resource never drags
/// the source page tree along.
struct ObjectImporter<'a> {
    source: &'a Document,
    imported: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectImporter<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            imported: HashMap::new(),
        }
    }

    fn copied(&self) -> usize {
        self.imported.len()
    }

    fn import(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.import_reference(target, *id)),
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(target, dict)),
            Object::Array(arr) => {
                Object::Array(arr.iter().map(|item| self.import(target, item)).collect())
            }
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.import_dictionary(target, &stream.dict);
                Object::Stream(copy)
            }
            // Boolean, Integer, Real, String, Name, Null.
            other => other.clone(),
        }
    }

    fn import_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.import(target, value));
        }
        copy
    }

    fn import_reference(&mut self, target: &mut Document, id: ObjectId) -> ObjectId {
        if let Some(&new_id) = self.imported.get(&id) {
            return new_id;
        }
        // Reserve the id before recursing so cycles resolve to it.
        let new_id = target.new_object_id();
        self.imported.insert(id, new_id);

        let source = self.source;
        let copy = match source.get_object(id) {
            Ok(object) => self.import(target, object),
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        };
        target.objects.insert(new_id, copy);
        new_id
    }
}
