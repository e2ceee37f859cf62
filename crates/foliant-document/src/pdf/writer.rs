// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — build native documents from foreign input.
//
// Text is laid out with `printpdf` 0.8 (built-in Helvetica, simple word wrap).
// Images are written directly with `lopdf` so the same pixels always produce
// the same bytes: one page sized to the image, one DeviceRGB XObject.

use std::path::Path;

use foliant_core::error::FoliantError;
use foliant_core::types::SheetSize;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};

use crate::image::RgbRaster;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Creates new PDF documents from text content or raster images.
pub struct PdfWriter {
    /// Page size used for text layout.
    page_size: SheetSize,
    /// Title metadata embedded in text PDFs.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(page_size: SheetSize) -> Self {
        Self {
            page_size,
            title: None,
        }
    }

    pub fn letter() -> Self {
        Self::new(SheetSize::letter())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Page dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        (
            Mm(self.page_size.width * MM_PER_PT),
            Mm(self.page_size.height * MM_PER_PT),
        )
    }

    // -- Text to PDF ----------------------------------------------------------

    /// Create a PDF from plain text content.
    ///
    /// The text is laid out top to bottom in 11pt Helvetica. Long lines are
    /// wrapped at an estimated character width and pages break automatically.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn create_from_text(&self, text: &str) -> Result<Vec<u8>, FoliantError> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Foliant Document");

        info!(title, "Creating text PDF");

        let font_size_pt: f32 = 11.0;
        let line_height_pt: f32 = 14.0;
        let margin_mm: f32 = 20.0;
        let margin_pt: f32 = Mm(margin_mm).into_pt().0;
        let usable_width_mm = page_w.0 - 2.0 * margin_mm;

        // Average Helvetica glyph width is roughly half the font size.
        let avg_char_width_mm: f32 = 0.50 * font_size_pt * MM_PER_PT;
        let max_chars_per_line = ((usable_width_mm / avg_char_width_mm) as usize).max(1);

        let wrapped_lines = wrap_text(text, max_chars_per_line);
        let page_h_pt = self.page_size.height;
        let usable_height_pt = page_h_pt - 2.0 * margin_pt;
        let lines_per_page = ((usable_height_pt / line_height_pt) as usize).max(1);

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::new();

        for chunk in wrapped_lines.chunks(lines_per_page) {
            let mut ops: Vec<Op> = Vec::new();
            for (line_idx, line) in chunk.iter().enumerate() {
                let y_pt = page_h_pt - margin_pt - (line_idx as f32 * line_height_pt);

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(margin_pt),
                        y: Pt(y_pt),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(font_size_pt),
                    font: BuiltinFont::Helvetica,
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(line.clone())],
                    font: BuiltinFont::Helvetica,
                });
                ops.push(Op::EndTextSection);
            }
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        // An empty file still yields one blank page.
        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        doc.with_pages(pages);

        debug!(
            total_lines = wrapped_lines.len(),
            pages = doc.pages.len(),
            "Text layout complete"
        );

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        Ok(output)
    }

    // -- Image to PDF ---------------------------------------------------------

    /// Create a single-page PDF showing `raster` edge to edge.
    ///
    /// The page measures `pixels * 72 / dpi` points on each axis.
    #[instrument(skip(self, raster), fields(width = raster.width, height = raster.height, dpi))]
    pub fn create_from_image(&self, raster: &RgbRaster, dpi: f32) -> Result<Vec<u8>, FoliantError> {
        if raster.width == 0 || raster.height == 0 {
            return Err(FoliantError::ImageError("image has no pixels".into()));
        }
        let expected = raster.width as usize * raster.height as usize * 3;
        if raster.pixels.len() != expected {
            return Err(FoliantError::ImageError(format!(
                "raster holds {} bytes, expected {}",
                raster.pixels.len(),
                expected
            )));
        }

        let page_w = raster.width as f32 * 72.0 / dpi;
        let page_h = raster.height as f32 * 72.0 / dpi;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut image_dict = Dictionary::new();
        image_dict.set("Type", Object::Name(b"XObject".to_vec()));
        image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
        image_dict.set("Width", Object::Integer(raster.width as i64));
        image_dict.set("Height", Object::Integer(raster.height as i64));
        image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        image_dict.set("BitsPerComponent", Object::Integer(8));
        let image_id = doc.add_object(Stream::new(image_dict, raster.pixels.clone()));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page_w),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(page_h),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content.encode().map_err(|err| {
            FoliantError::PdfError(format!("failed to encode image page content: {}", err))
        })?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content_bytes));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page_w),
                Object::Real(page_h),
            ]),
        );
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        let page_id = doc.add_object(Object::Dictionary(page));

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(Object::Dictionary(catalog));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            FoliantError::PdfError(format!("failed to serialise image PDF: {}", err))
        })?;

        debug!(page_w, page_h, bytes = output.len(), "Image page written");
        Ok(output)
    }

    // -- File output convenience ----------------------------------------------

    /// Create a text PDF and write it directly to a file.
    pub fn write_text_to_file(&self, text: &str, path: impl AsRef<Path>) -> Result<(), FoliantError> {
        let bytes = self.create_from_text(text)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote text PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// Create an image PDF and write it directly to a file.
    pub fn write_image_to_file(
        &self,
        raster: &RgbRaster,
        dpi: f32,
        path: impl AsRef<Path>,
    ) -> Result<(), FoliantError> {
        let bytes = self.create_from_image(raster, dpi)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote image PDF to {}", path.as_ref().display());
        Ok(())
    }
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// paragraph. Words longer than `max_width` are force-broken on char boundaries.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::with_capacity(max_width);
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                let mut pieces = chars.chunks(max_width).peekable();
                while let Some(piece) = pieces.next() {
                    let piece: String = piece.iter().collect();
                    if pieces.peek().is_some() {
                        result.push(piece);
                    } else {
                        current_len = piece.chars().count();
                        current_line = piece;
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_raster(width: u32, height: u32) -> RgbRaster {
        RgbRaster {
            width,
            height,
            pixels: vec![200; (width * height * 3) as usize],
        }
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_breaks_long_words() {
        let lines = wrap_text("abcdefghijkl", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn wrap_keeps_blank_lines() {
        let lines = wrap_text("one\n\ntwo", 20);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn image_page_is_sized_from_dpi() {
        let writer = PdfWriter::letter();
        let bytes = writer
            .create_from_image(&solid_raster(144, 72), 72.0)
            .expect("image pdf");
        let doc = Document::load_mem(&bytes).expect("reload");
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page = doc
            .get_object(pages[&1])
            .and_then(Object::as_dict)
            .expect("page dict");
        let media_box = page
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .expect("media box");
        assert_eq!(media_box.len(), 4);
        assert_eq!(media_box[2].as_float().expect("width"), 144.0);
        assert_eq!(media_box[3].as_float().expect("height"), 72.0);
    }

    #[test]
    fn image_pdf_is_deterministic() {
        let writer = PdfWriter::letter();
        let raster = solid_raster(8, 8);
        let a = writer.create_from_image(&raster, 150.0).expect("first");
        let b = writer.create_from_image(&raster, 150.0).expect("second");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_raster_is_rejected() {
        let writer = PdfWriter::letter();
        let err = writer.create_from_image(&solid_raster(0, 0), 72.0).unwrap_err();
        assert!(matches!(err, FoliantError::ImageError(_)));
    }

    #[test]
    fn text_pdf_has_pages() {
        let writer = PdfWriter::letter();
        let text = "line\n".repeat(120);
        let bytes = writer.create_from_text(&text).expect("text pdf");
        let doc = Document::load_mem(&bytes).expect("reload");
        assert!(doc.get_pages().len() >= 2);
    }
}
