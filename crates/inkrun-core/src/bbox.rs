// this_file: crates/inkrun-core/src/bbox.rs

//! Tight ink bounds of a glyph run and the canvas that holds them
//!
//! Minima floor and maxima ceil, so the rectangle always covers every
//! partially inked pixel. The canvas is then sized in a fixed order:
//! translate by the pen origin, stretch to include that origin, pad.

use crate::fixed::F26Dot6;
use crate::geometry::{BoundingRect, CanvasSize, Point};
use crate::types::{GlyphId, InkExtents, ShapedGlyph};

/// Where the canvas ends up and where the pen starts on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    pub size: CanvasSize,
    /// Pen start in canvas pixels, padding included
    pub pen: Point,
}

/// Ink rectangle of the run with the pen starting at (0,0).
///
/// Glyphs without extents (spaces) only move the pen. Returns the degenerate
/// `(0,0)-(0,0)` rectangle when nothing carries ink.
pub fn compute_bounding_rect<F>(glyphs: &[ShapedGlyph], extents_lookup: F) -> BoundingRect
where
    F: FnMut(GlyphId) -> Option<InkExtents>,
{
    ink_bounds(glyphs, extents_lookup).unwrap_or(BoundingRect::EMPTY)
}

/// Same walk as [`compute_bounding_rect`], but None when nothing carries ink
pub fn ink_bounds<F>(glyphs: &[ShapedGlyph], mut extents_lookup: F) -> Option<BoundingRect>
where
    F: FnMut(GlyphId) -> Option<InkExtents>,
{
    let mut pen = Point::ORIGIN;
    let mut bounds: Option<BoundingRect> = None;

    for glyph in glyphs {
        if let Some(ext) = extents_lookup(glyph.glyph_id) {
            let origin = pen + glyph.offset;
            let x0 = F26Dot6::from_pixels(origin.x) + ext.x_bearing;
            let y0 = F26Dot6::from_pixels(origin.y) + ext.y_bearing;
            let x1 = x0 + ext.width;
            let y1 = y0 + ext.height;

            let glyph_rect = BoundingRect::new(
                Point::new(x0.min(x1).to_pixel_floor(), y0.min(y1).to_pixel_floor()),
                Point::new(x0.max(x1).to_pixel_ceil(), y0.max(y1).to_pixel_ceil()),
            );

            log::trace!(
                "glyph {} ink ({},{})-({},{})",
                glyph.glyph_id,
                glyph_rect.min.x,
                glyph_rect.min.y,
                glyph_rect.max.x,
                glyph_rect.max.y
            );

            bounds = Some(match bounds {
                Some(acc) => acc.union(&glyph_rect),
                None => glyph_rect,
            });
        }

        pen += glyph.advance;
    }

    bounds
}

/// Canvas dimensions for `bbox` drawn with the pen starting at `pen_origin`
pub fn required_canvas_size(bbox: &BoundingRect, pen_origin: Point, padding: u32) -> CanvasSize {
    canvas_layout(bbox, pen_origin, padding).size
}

/// Canvas dimensions plus the pen start that puts the ink inside them.
///
/// The origin itself is always kept on the canvas, since the baseline start
/// may sit outside the ink (leading whitespace, glyphs hanging below).
pub fn canvas_layout(bbox: &BoundingRect, pen_origin: Point, padding: u32) -> CanvasLayout {
    let placed = bbox.translate(pen_origin);

    let min_x = i64::from(placed.min.x.min(0));
    let min_y = i64::from(placed.min.y.min(0));
    let max_x = i64::from(placed.max.x.max(0));
    let max_y = i64::from(placed.max.y.max(0));

    let pad = i64::from(padding);
    let width = (max_x - min_x + 2 * pad).clamp(0, i64::from(u32::MAX)) as u32;
    let height = (max_y - min_y + 2 * pad).clamp(0, i64::from(u32::MAX)) as u32;

    let pen = Point::new(
        saturate(i64::from(pen_origin.x) - min_x + pad),
        saturate(i64::from(pen_origin.y) - min_y + pad),
    );

    CanvasLayout {
        size: CanvasSize::new(width, height),
        pen,
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
