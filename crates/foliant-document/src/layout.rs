// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet layout — where each source page lands on an output sheet and how far it
// is scaled. Pure geometry; no document state.

use foliant_core::error::{FoliantError, Result};
use foliant_core::types::{Imposition, SheetSize};

/// Axis-aligned rectangle in PDF points, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from a PDF box array `[llx lly urx ury]`, normalising corner order.
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        let (x0, x1) = if llx <= urx { (llx, urx) } else { (urx, llx) };
        let (y0, y1) = if lly <= ury { (lly, ury) } else { (ury, lly) };
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Containment with a small tolerance for float rounding.
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.top() <= self.top() + EPS
    }
}

/// Uniform scale plus translation that maps a source page into a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Placement {
    /// The `cm` operands `[a b c d e f]` for this placement (no rotation).
    pub fn matrix(&self) -> [f32; 6] {
        [
            self.scale,
            0.0,
            0.0,
            self.scale,
            self.translate_x,
            self.translate_y,
        ]
    }

    /// Where `source` ends up on the sheet once transformed.
    pub fn placed_bounds(&self, source: &Rect) -> Rect {
        Rect::new(
            source.x * self.scale + self.translate_x,
            source.y * self.scale + self.translate_y,
            source.width * self.scale,
            source.height * self.scale,
        )
    }
}

/// Fixed sheet plus an imposition policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetLayout {
    pub sheet: SheetSize,
    pub imposition: Imposition,
}

impl SheetLayout {
    pub fn new(sheet: SheetSize, imposition: Imposition) -> Self {
        Self { sheet, imposition }
    }

    pub fn sheet_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.sheet.width, self.sheet.height)
    }

    pub fn slots_per_sheet(&self) -> usize {
        self.imposition.pages_per_sheet()
    }

    /// Slots in fill order. Two-up splits the sheet at its horizontal midpoint.
    pub fn slots(&self) -> Vec<Rect> {
        let Self { sheet, imposition } = *self;
        match imposition {
            Imposition::OneUp => vec![self.sheet_rect()],
            Imposition::TwoUp => {
                let half = sheet.width / 2.0;
                vec![
                    Rect::new(0.0, 0.0, half, sheet.height),
                    Rect::new(half, 0.0, half, sheet.height),
                ]
            }
        }
    }

    /// Fit `source` into `slot`, preserving aspect ratio and anchoring the
    /// source box's lower-left corner at the slot origin.
    ///
    /// `scale = min(slot.width / source.width, slot.height / source.height)`.
    pub fn placement(&self, slot: &Rect, source: &Rect) -> Result<Placement> {
        if !(source.width > 0.0 && source.height > 0.0) {
            return Err(FoliantError::PdfError(format!(
                "page has degenerate size {} x {}",
                source.width, source.height
            )));
        }
        let scale_x = slot.width / source.width;
        let scale_y = slot.height / source.height;
        let scale = scale_x.min(scale_y);

        Ok(Placement {
            scale,
            translate_x: slot.x - source.x * scale,
            translate_y: slot.y - source.y * scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliant_core::types::{Orientation, PaperSize};

    fn letter_one_up() -> SheetLayout {
        SheetLayout::new(SheetSize::letter(), Imposition::OneUp)
    }

    #[test]
    fn same_size_page_is_unscaled() {
        let layout = letter_one_up();
        let slot = layout.slots()[0];
        let p = layout
            .placement(&slot, &Rect::new(0.0, 0.0, 612.0, 792.0))
            .expect("placement");
        assert_eq!(p.scale, 1.0);
        assert_eq!((p.translate_x, p.translate_y), (0.0, 0.0));
    }

    #[test]
    fn scale_is_min_of_axis_ratios() {
        let layout = letter_one_up();
        let slot = layout.slots()[0];
        // A4 landscape: width-bound.
        let source = Rect::new(0.0, 0.0, 842.0, 595.0);
        let p = layout.placement(&slot, &source).expect("placement");
        let expected = (612.0f32 / 842.0).min(792.0 / 595.0);
        assert!((p.scale - expected).abs() < 1e-6);
        assert!((p.scale - 612.0 / 842.0).abs() < 1e-6);
    }

    #[test]
    fn small_pages_are_scaled_up() {
        let layout = letter_one_up();
        let slot = layout.slots()[0];
        let p = layout
            .placement(&slot, &Rect::new(0.0, 0.0, 306.0, 198.0))
            .expect("placement");
        assert_eq!(p.scale, 2.0);
    }

    #[test]
    fn placed_bounds_stay_inside_sheet() {
        let layout = letter_one_up();
        let sheet = layout.sheet_rect();
        let slot = layout.slots()[0];
        let sources = [
            Rect::new(0.0, 0.0, 100.0, 1000.0),
            Rect::new(0.0, 0.0, 5000.0, 20.0),
            Rect::new(50.0, 80.0, 595.0, 842.0),
            Rect::new(-200.0, -300.0, 1.0, 1.0),
        ];
        for source in sources {
            let p = layout.placement(&slot, &source).expect("placement");
            let placed = p.placed_bounds(&source);
            assert!(sheet.contains(&placed), "{placed:?} escapes {sheet:?}");
            assert!((placed.x - 0.0).abs() < 1e-3 && (placed.y - 0.0).abs() < 1e-3);
        }
    }

    #[test]
    fn offset_media_box_is_anchored_at_origin() {
        let layout = letter_one_up();
        let slot = layout.slots()[0];
        let source = Rect::from_corners(100.0, 100.0, 712.0, 892.0);
        let p = layout.placement(&slot, &source).expect("placement");
        assert_eq!(p.scale, 1.0);
        assert_eq!(p.matrix(), [1.0, 0.0, 0.0, 1.0, -100.0, -100.0]);
    }

    #[test]
    fn two_up_splits_sheet_at_midpoint() {
        let sheet = SheetSize::new(PaperSize::A3, Orientation::Landscape);
        let layout = SheetLayout::new(sheet, Imposition::TwoUp);
        let slots = layout.slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].x, sheet.width / 2.0);

        let source = Rect::new(0.0, 0.0, 595.28, 841.89);
        let right = layout.placement(&slots[1], &source).expect("placement");
        let placed = right.placed_bounds(&source);
        assert!(slots[1].contains(&placed));
        assert!(layout.sheet_rect().contains(&placed));
        assert!((right.translate_x - sheet.width / 2.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_page_is_rejected() {
        let layout = letter_one_up();
        let slot = layout.slots()[0];
        let err = layout
            .placement(&slot, &Rect::new(0.0, 0.0, 0.0, 792.0))
            .unwrap_err();
        assert!(matches!(err, FoliantError::PdfError(_)));
    }

    #[test]
    fn corners_are_normalised() {
        let r = Rect::from_corners(612.0, 792.0, 0.0, 0.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 612.0, 792.0));
    }
}
