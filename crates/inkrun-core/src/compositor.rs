// this_file: crates/inkrun-core/src/compositor.rs

//! Blending glyph coverage onto the canvas
//!
//! Coverage is composited with a bounded "over" rule on a single channel:
//! `dst' = dst + a * (255 - dst) / 255`. The result never decreases and never
//! passes 255, however many glyphs overlap. Pixels that fall off the canvas
//! are dropped without complaint.

use crate::canvas::Canvas;
use crate::error::{RenderError, Result};
use crate::geometry::Point;
use crate::traits::{FaceHandle, GlyphRasterizer};
use crate::types::{CoverageBitmap, CoverageFormat, GlyphRun};

/// Blend one coverage value over one canvas value
#[inline]
pub fn blend_over(dst: u8, coverage: u8) -> u8 {
    let dst = u32::from(dst);
    (dst + u32::from(coverage) * (255 - dst) / 255) as u8
}

/// Blend a Gray8 bitmap with its top-left pixel at `origin`, clipping to the canvas
pub fn blit_coverage(canvas: &mut Canvas, bitmap: &CoverageBitmap<'_>, origin: Point) -> Result<()> {
    if bitmap.format != CoverageFormat::Gray8 {
        return Err(RenderError::UnsupportedPixelFormat(bitmap.format).into());
    }
    if bitmap.is_empty() {
        return Ok(());
    }

    let canvas_width = i64::from(canvas.width());
    let canvas_height = i64::from(canvas.height());
    let ox = i64::from(origin.x);
    let oy = i64::from(origin.y);

    // Visible column span of the bitmap
    let col_start = (-ox).clamp(0, i64::from(bitmap.width));
    let col_end = (canvas_width - ox).clamp(0, i64::from(bitmap.width));
    if col_start >= col_end {
        return Ok(());
    }

    for gy in 0..bitmap.height {
        let py = oy + i64::from(gy);
        if py < 0 || py >= canvas_height {
            continue;
        }

        let Some(src) = bitmap.row(gy) else {
            continue;
        };
        let Some(dst) = canvas.row_mut(py as u32) else {
            continue;
        };

        let src = &src[col_start as usize..col_end as usize];
        let dst_start = (ox + col_start) as usize;
        let dst = &mut dst[dst_start..dst_start + src.len()];

        for (d, &a) in dst.iter_mut().zip(src) {
            if a != 0 {
                *d = blend_over(*d, a);
            }
        }
    }

    Ok(())
}

/// Draws a glyph run onto a canvas, one glyph at a time
///
/// Owns the scratch buffer the rasterizer renders into, so one compositor
/// belongs to exactly one render job.
pub struct GlyphCompositor<'r> {
    rasterizer: &'r dyn GlyphRasterizer,
    scratch: Vec<u8>,
}

impl<'r> GlyphCompositor<'r> {
    pub fn new(rasterizer: &'r dyn GlyphRasterizer) -> Self {
        Self {
            rasterizer,
            scratch: Vec::new(),
        }
    }

    /// Composite every glyph of `run`, pen starting at `pen_origin`.
    ///
    /// Stops at the first rasterizer failure or unsupported bitmap format;
    /// the canvas is then in an unspecified state and should be discarded.
    pub fn composite(
        &mut self,
        canvas: &mut Canvas,
        face: &dyn FaceHandle,
        run: &GlyphRun,
        pen_origin: Point,
    ) -> Result<()> {
        let mut pen = pen_origin;

        for glyph in run {
            let bitmap = self
                .rasterizer
                .rasterize(face, glyph.glyph_id, &mut self.scratch)?;

            // Bearing counts up from the baseline, rows count down
            let origin = pen + glyph.offset + Point::new(bitmap.left, -bitmap.top);

            log::trace!(
                "glyph {} at ({},{}) {}x{}",
                glyph.glyph_id,
                origin.x,
                origin.y,
                bitmap.width,
                bitmap.height
            );

            blit_coverage(canvas, &bitmap, origin)?;

            pen += glyph.advance;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InkrunError;
    use proptest::prelude::*;

    fn gray<'a>(width: u32, height: u32, data: &'a [u8]) -> CoverageBitmap<'a> {
        CoverageBitmap {
            left: 0,
            top: 0,
            width,
            height,
            pitch: width,
            format: CoverageFormat::Gray8,
            data,
        }
    }

    #[test]
    fn test_blend_endpoints() {
        assert_eq!(blend_over(0, 0), 0);
        assert_eq!(blend_over(0, 255), 255);
        assert_eq!(blend_over(255, 255), 255);
        assert_eq!(blend_over(100, 0), 100);
        // 128 + 128 * 127 / 255 = 128 + 63
        assert_eq!(blend_over(128, 128), 191);
    }

    #[test]
    fn test_blit_in_bounds() {
        let mut canvas = Canvas::create(4, 3).expect("canvas");
        let data = [255, 128, 64, 0];
        blit_coverage(&mut canvas, &gray(2, 2, &data), Point::new(1, 1)).expect("blit");
        assert_eq!(
            canvas.pixels(),
            &[0, 0, 0, 0, 0, 255, 128, 0, 0, 64, 0, 0]
        );
    }

    #[test]
    fn test_blit_clips_partially() {
        let mut canvas = Canvas::create(2, 2).expect("canvas");
        let data = [10, 20, 30, 40];
        blit_coverage(&mut canvas, &gray(2, 2, &data), Point::new(-1, -1)).expect("blit");
        assert_eq!(canvas.pixels(), &[40, 0, 0, 0]);
    }

    #[test]
    fn test_blit_fully_outside_is_noop() {
        let data = [255; 9];
        for origin in [
            Point::new(-3, 0),
            Point::new(5, 0),
            Point::new(0, -3),
            Point::new(0, 5),
            Point::new(i32::MIN, i32::MAX),
        ] {
            let mut canvas = Canvas::create(5, 5).expect("canvas");
            blit_coverage(&mut canvas, &gray(3, 3, &data), origin).expect("clipping is not an error");
            assert!(canvas.pixels().iter().all(|&p| p == 0));
        }
    }

    #[test]
    fn test_blit_rejects_color_formats() {
        let mut canvas = Canvas::create(2, 2).expect("canvas");
        let data = [0u8; 12];
        let bitmap = CoverageBitmap {
            format: CoverageFormat::Lcd,
            ..gray(1, 1, &data)
        };
        let result = blit_coverage(&mut canvas, &bitmap, Point::ORIGIN);
        assert!(matches!(
            result,
            Err(InkrunError::Render(RenderError::UnsupportedPixelFormat(
                CoverageFormat::Lcd
            )))
        ));
    }

    #[test]
    fn test_blit_respects_pitch() {
        let mut canvas = Canvas::create(2, 2).expect("canvas");
        let data = [1, 2, 99, 3, 4, 99];
        let bitmap = CoverageBitmap {
            pitch: 3,
            ..gray(2, 2, &data)
        };
        blit_coverage(&mut canvas, &bitmap, Point::ORIGIN).expect("blit");
        assert_eq!(canvas.pixels(), &[1, 2, 3, 4]);
    }

    proptest! {
        #[test]
        fn prop_blend_is_bounded_and_monotonic(start in any::<u8>(), layers in proptest::collection::vec(any::<u8>(), 0..32)) {
            let mut value = start;
            for a in layers {
                let next = blend_over(value, a);
                prop_assert!(next >= value);
                value = next;
            }
        }

        #[test]
        fn prop_full_coverage_saturates(dst in any::<u8>()) {
            prop_assert_eq!(blend_over(dst, 255), 255);
        }
    }
}
