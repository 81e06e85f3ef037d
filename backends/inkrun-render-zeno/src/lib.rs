// this_file: backends/inkrun-render-zeno/src/lib.rs

//! Zeno rasterizer: glyph outlines to 8-bit coverage, pure Rust
//!
//! Outlines are drawn with skrifa at the face's pixel size into two paths
//! at once: an SVG path string that zeno rasterizes, and a kurbo path whose
//! bounding box gives the ink extents. Both are built y-down, so the mask
//! comes out of zeno already in canvas orientation.
//!
//! Ink extents are quantised outward to 26.6 (floor for minima, ceil for
//! maxima) and the bitmap covers exactly the whole pixels those extents
//! touch, so sizing and drawing always agree on where the ink is.

use std::fmt::Write as _;

use kurbo::Shape;
use skrifa::{
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
    FontRef, GlyphId as SkrifaGlyphId, MetadataProvider,
};
use zeno::Mask;

use inkrun_core::{
    error::{RenderError, Result},
    fixed::F26Dot6,
    traits::{FaceHandle, GlyphRasterizer},
    types::{CoverageBitmap, CoverageFormat, GlyphId, InkExtents},
};

/// Largest bitmap side we agree to rasterize
pub const MAX_GLYPH_DIMENSION: u32 = 4096;

/// Glyph rasterizer backed by zeno
///
/// Holds no per-glyph state; the coverage lands in the caller's scratch
/// buffer.
#[derive(Debug, Clone, Copy)]
pub struct ZenoRasterizer {
    max_size: u32,
}

impl ZenoRasterizer {
    pub fn new() -> Self {
        Self {
            max_size: MAX_GLYPH_DIMENSION,
        }
    }

    /// Lower the per-side bitmap limit
    pub fn with_max_size(max_size: u32) -> Self {
        Self {
            max_size: max_size.min(MAX_GLYPH_DIMENSION),
        }
    }

    /// Draw one glyph outline at the face's pixel size.
    ///
    /// `Ok(None)` means the glyph exists but leaves no ink.
    fn outline(
        &self,
        face: &dyn FaceHandle,
        glyph_id: GlyphId,
    ) -> std::result::Result<Option<GlyphOutline>, String> {
        let font = FontRef::from_index(face.data(), face.face_index())
            .map_err(|e| format!("font data rejected: {}", e))?;

        let outlines = font.outline_glyphs();
        let glyph = outlines
            .get(SkrifaGlyphId::new(glyph_id))
            .ok_or_else(|| "no outline in font".to_string())?;

        let settings = DrawSettings::unhinted(
            Size::new(face.pixel_size() as f32),
            LocationRef::default(),
        );

        let mut pen = CanvasPathBuilder::new();
        glyph
            .draw(settings, &mut pen)
            .map_err(|e| format!("outline extraction failed: {}", e))?;

        Ok(pen.finish())
    }
}

impl Default for ZenoRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer for ZenoRasterizer {
    fn name(&self) -> &'static str {
        "Zeno"
    }

    fn extents(&self, face: &dyn FaceHandle, glyph_id: GlyphId) -> Option<InkExtents> {
        match self.outline(face, glyph_id) {
            Ok(outline) => outline.map(|o| o.extents),
            Err(reason) => {
                log::debug!("No extents for glyph {}: {}", glyph_id, reason);
                None
            },
        }
    }

    fn rasterize<'s>(
        &self,
        face: &dyn FaceHandle,
        glyph_id: GlyphId,
        scratch: &'s mut Vec<u8>,
    ) -> Result<CoverageBitmap<'s>> {
        let failed = |reason: String| RenderError::RasterizeFailed { glyph_id, reason };

        let Some(outline) = self.outline(face, glyph_id).map_err(failed)? else {
            return Ok(CoverageBitmap::empty());
        };

        let placement = outline.placement();
        if placement.width > self.max_size || placement.height > self.max_size {
            return Err(failed(format!(
                "{}x{} exceeds the {}px limit",
                placement.width, placement.height, self.max_size
            ))
            .into());
        }

        scratch.clear();
        scratch.resize(placement.width as usize * placement.height as usize, 0);

        Mask::new(outline.svg.as_str())
            .size(placement.width, placement.height)
            .offset((-placement.left, -placement.top_row))
            .render_into(scratch, None);

        log::trace!(
            "Glyph {} rasterized {}x{} at ({},{})",
            glyph_id,
            placement.width,
            placement.height,
            placement.left,
            placement.top_row
        );

        Ok(CoverageBitmap {
            left: placement.left,
            top: -placement.top_row,
            width: placement.width,
            height: placement.height,
            pitch: placement.width,
            format: CoverageFormat::Gray8,
            data: scratch,
        })
    }
}

/// An outline in canvas orientation, pen at the origin
struct GlyphOutline {
    svg: String,
    extents: InkExtents,
}

/// Whole-pixel box covering a glyph's ink
#[derive(Debug, PartialEq, Eq)]
struct Placement {
    left: i32,
    /// Canvas row of the top edge relative to the baseline (negative above it)
    top_row: i32,
    width: u32,
    height: u32,
}

impl GlyphOutline {
    fn placement(&self) -> Placement {
        let ext = &self.extents;
        let left = ext.x_bearing.to_pixel_floor();
        let top_row = ext.y_bearing.to_pixel_floor();
        let right = (ext.x_bearing + ext.width).to_pixel_ceil();
        let bottom = (ext.y_bearing + ext.height).to_pixel_ceil();
        Placement {
            left,
            top_row,
            width: right.saturating_sub(left).max(0) as u32,
            height: bottom.saturating_sub(top_row).max(0) as u32,
        }
    }
}

/// Quantise a y-down pixel rectangle outward to 26.6 ink extents
fn extents_from_bounds(bounds: kurbo::Rect) -> Option<InkExtents> {
    if !bounds.is_finite() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }

    let x0 = F26Dot6::floor_from_f32(bounds.x0 as f32);
    let y0 = F26Dot6::floor_from_f32(bounds.y0 as f32);
    let x1 = F26Dot6::ceil_from_f32(bounds.x1 as f32);
    let y1 = F26Dot6::ceil_from_f32(bounds.y1 as f32);

    Some(InkExtents {
        x_bearing: x0,
        y_bearing: y0,
        width: x1 - x0,
        height: y1 - y0,
    })
}

/// Builds the SVG path for zeno and the kurbo path for bounds in one pass,
/// flipping font y-up into canvas y-down on the way
struct CanvasPathBuilder {
    svg: String,
    path: kurbo::BezPath,
}

impl CanvasPathBuilder {
    fn new() -> Self {
        Self {
            svg: String::new(),
            path: kurbo::BezPath::new(),
        }
    }

    fn finish(self) -> Option<GlyphOutline> {
        let extents = extents_from_bounds(self.path.bounding_box())?;
        Some(GlyphOutline {
            svg: self.svg,
            extents,
        })
    }
}

impl OutlinePen for CanvasPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let _ = write!(self.svg, "M{:.3},{:.3} ", x, -y);
        self.path.move_to((f64::from(x), f64::from(-y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let _ = write!(self.svg, "L{:.3},{:.3} ", x, -y);
        self.path.line_to((f64::from(x), f64::from(-y)));
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let _ = write!(self.svg, "Q{:.3},{:.3} {:.3},{:.3} ", cx, -cy, x, -y);
        self.path
            .quad_to((f64::from(cx), f64::from(-cy)), (f64::from(x), f64::from(-y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let _ = write!(
            self.svg,
            "C{:.3},{:.3} {:.3},{:.3} {:.3},{:.3} ",
            cx0, -cy0, cx1, -cy1, x, -y
        );
        self.path.curve_to(
            (f64::from(cx0), f64::from(-cy0)),
            (f64::from(cx1), f64::from(-cy1)),
            (f64::from(x), f64::from(-y)),
        );
    }

    fn close(&mut self) {
        self.svg.push_str("Z ");
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkrun_core::InkrunError;

    struct NotAFont;

    impl FaceHandle for NotAFont {
        fn data(&self) -> &[u8] {
            &[0, 1, 0, 0]
        }
        fn pixel_size(&self) -> u32 {
            32
        }
        fn units_per_em(&self) -> u16 {
            1000
        }
        fn ascender(&self) -> F26Dot6 {
            F26Dot6::ZERO
        }
        fn glyph_id(&self, _ch: char) -> Option<GlyphId> {
            None
        }
    }

    fn square(pen: &mut CanvasPathBuilder, x0: f32, y0: f32, x1: f32, y1: f32) {
        pen.move_to(x0, y0);
        pen.line_to(x1, y0);
        pen.line_to(x1, y1);
        pen.line_to(x0, y1);
        pen.close();
    }

    #[test]
    fn test_builder_flips_to_canvas_orientation() {
        let mut pen = CanvasPathBuilder::new();
        // font units: 1..11 across, baseline to 20 up
        square(&mut pen, 1.0, 0.0, 11.0, 20.0);
        let outline = pen.finish().expect("square has ink");

        assert_eq!(outline.extents.x_bearing, F26Dot6::from_pixels(1));
        assert_eq!(outline.extents.y_bearing, F26Dot6::from_pixels(-20));
        assert_eq!(outline.extents.width, F26Dot6::from_pixels(10));
        assert_eq!(outline.extents.height, F26Dot6::from_pixels(20));
        assert!(outline.svg.starts_with("M1.000,"));
    }

    #[test]
    fn test_fractional_bounds_round_outward() {
        let mut pen = CanvasPathBuilder::new();
        square(&mut pen, -0.3, -2.25, 4.1, 7.5);
        let outline = pen.finish().expect("square has ink");

        assert_eq!(
            outline.placement(),
            Placement {
                left: -1,
                top_row: -8,
                width: 6,
                height: 11,
            }
        );
    }

    #[test]
    fn test_empty_outline_has_no_extents() {
        assert!(CanvasPathBuilder::new().finish().is_none());

        let mut flat = CanvasPathBuilder::new();
        flat.move_to(0.0, 5.0);
        flat.line_to(10.0, 5.0);
        flat.close();
        assert!(flat.finish().is_none());
    }

    #[test]
    fn test_bad_font_fails_rasterize_and_has_no_extents() {
        let rasterizer = ZenoRasterizer::new();
        assert!(rasterizer.extents(&NotAFont, 1).is_none());

        let mut scratch = Vec::new();
        let result = rasterizer.rasterize(&NotAFont, 1, &mut scratch);
        assert!(matches!(
            result,
            Err(InkrunError::Render(RenderError::RasterizeFailed { glyph_id: 1, .. }))
        ));
    }

    #[test]
    fn test_max_size_is_capped() {
        assert_eq!(ZenoRasterizer::with_max_size(10_000).max_size, MAX_GLYPH_DIMENSION);
        assert_eq!(ZenoRasterizer::with_max_size(64).max_size, 64);
    }
}
