// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for merge integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::Content;
use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream,
    StringFormat,
};

use foliant_core::MergeConfig;
use foliant_document::{BuiltinEngine, EngineSession};

/// Write a PDF whose pages each draw `"{label}-Page-{n}"`.
pub fn write_pdf(dir: &Path, name: &str, label: &str, pages: u32, size: (i64, i64)) -> PathBuf {
    let mut doc = labelled_document(label, pages, size);
    let path = dir.join(name);
    doc.save(&path).expect("save fixture pdf");
    path
}

/// Write a one-page letter PDF encrypted with `user_password`.
///
/// An empty user password opens without prompting; anything else locks it.
pub fn write_encrypted_pdf(dir: &Path, name: &str, label: &str, user_password: &str) -> PathBuf {
    let mut doc = labelled_document(label, 1, (612, 792));
    let id = Object::String(b"foliant-fixture-id".to_vec(), StringFormat::Literal);
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    })
    .expect("encryption state");
    doc.encrypt(&state).expect("encrypt fixture");

    let path = dir.join(name);
    doc.save(&path).expect("save encrypted fixture");
    path
}

fn labelled_document(label: &str, pages: u32, size: (i64, i64)) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));
    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT /F1 24 Tf 72 72 Td ({label}-Page-{n}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources.clone()));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(size.0),
                Object::Integer(size.1),
            ]),
        );
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut tree = Dictionary::new();
    tree.set("Type", Object::Name(b"Pages".to_vec()));
    tree.set("Count", Object::Integer(pages as i64));
    tree.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(tree));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

/// Write a small solid-colour PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
        .save(&path)
        .expect("save fixture png");
    path
}

pub fn session() -> EngineSession<BuiltinEngine> {
    EngineSession::start(BuiltinEngine::default(), None).expect("start engine")
}

/// Default configuration with scratch storage under `root`.
pub fn config_in(root: &Path) -> MergeConfig {
    MergeConfig {
        scratch_root: Some(root.to_path_buf()),
        ..MergeConfig::default()
    }
}

/// Entries of the scratch root left behind by runs.
pub fn leftover_scratch(root: &Path) -> Vec<String> {
    match std::fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("foliant-"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Decoded content of the first form drawn on every output page, in page order.
pub fn page_labels(path: &Path) -> Vec<String> {
    let mut doc = Document::load(path).expect("load output");
    doc.decompress();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let page = doc.get_object(*page_id).and_then(Object::as_dict).expect("page");
            let xobjects = page
                .get(b"Resources")
                .and_then(Object::as_dict)
                .and_then(|r| r.get(b"XObject"))
                .and_then(Object::as_dict)
                .expect("xobjects");
            let form_id = xobjects
                .get(b"Fm0")
                .and_then(Object::as_reference)
                .expect("form");
            let form = doc
                .get_object(form_id)
                .and_then(Object::as_stream)
                .expect("form stream");
            String::from_utf8_lossy(&form.content).into_owned()
        })
        .collect()
}

/// `cm` operands of every placement on page `number`.
pub fn placements(path: &Path, number: u32) -> Vec<Vec<f32>> {
    let mut doc = Document::load(path).expect("load output");
    doc.decompress();
    let page_id = doc.get_pages()[&number];
    let content = doc.get_page_content(page_id).expect("content");
    Content::decode(&content)
        .expect("decode")
        .operations
        .into_iter()
        .filter(|op| op.operator == "cm")
        .map(|op| {
            op.operands
                .iter()
                .map(|o| o.as_float().expect("number"))
                .collect()
        })
        .collect()
}
