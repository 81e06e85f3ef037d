//! Inkrun Core: from a line of text to a grayscale raster
//!
//! Text enters as UTF-8, leaves as a single-channel 8-bit canvas sized to
//! fit the ink exactly. This crate holds the parts that decide what that
//! canvas looks like; finding fonts, shaping and rasterizing single glyphs
//! are delegated to backends behind the traits in [`traits`].
//!
//! ## The Pipeline
//!
//! Every render job walks the same states:
//!
//! 1. **FaceLoaded** - the font query resolves to a file, the file opens at the requested pixel size
//! 2. **Shaped** - characters become positioned glyphs (`'?'` stands in for missing ones)
//! 3. **Sized** - the tight ink box and the pen origin fix the canvas dimensions
//! 4. **Rendered** - each glyph's coverage is blended onto the canvas
//! 5. **Done** - the canvas is handed to the caller and the face is released
//!
//! Any error sends the job to **Failed** instead; nothing partial comes back.
//!
//! ## Build Your First Pipeline
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use inkrun_core::{RenderPipeline, RenderRequest};
//! # use inkrun_core::traits::*;
//! # fn backends() -> (Arc<dyn FontResolver>, Arc<dyn FaceLoader>, Arc<dyn ShapingEngine>, Arc<dyn GlyphRasterizer>) { unimplemented!() }
//!
//! let (resolver, loader, shaper, rasterizer) = backends();
//! let pipeline = RenderPipeline::builder()
//!     .resolver(resolver)
//!     .loader(loader)
//!     .shaper(shaper)
//!     .rasterizer(rasterizer)
//!     .build()?;
//!
//! let canvas = pipeline.render(&RenderRequest::new("Hello").pixel_size(48))?;
//! println!("{}x{}", canvas.width(), canvas.height());
//! # Ok::<(), inkrun_core::InkrunError>(())
//! ```

pub mod bbox;
pub mod canvas;
pub mod compositor;
pub mod context;
pub mod error;
pub mod fallback;
pub mod fixed;
pub mod geometry;
pub mod pipeline;
pub mod traits;

pub use canvas::Canvas;
pub use context::PipelineContext;
pub use error::{InkrunError, Result};
pub use geometry::{BoundingRect, CanvasSize, Point};
pub use pipeline::{PipelineState, RenderPipeline, RenderPipelineBuilder};

/// The data that flows between collaborators
pub mod types {
    use crate::fixed::F26Dot6;
    use crate::geometry::{CanvasSize, Point};

    /// Face-scoped glyph identifier
    pub type GlyphId = u32;

    /// One glyph as placed by the shaper, in whole pixels
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShapedGlyph {
        pub glyph_id: GlyphId,
        /// Displacement applied before placement (mark attachment)
        pub offset: Point,
        /// Pen movement after placement
        pub advance: Point,
    }

    impl ShapedGlyph {
        pub const fn new(glyph_id: GlyphId, offset: Point, advance: Point) -> Self {
            Self {
                glyph_id,
                offset,
                advance,
            }
        }
    }

    /// Shaped glyphs in visual order, plus an optional canvas size hint
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct GlyphRun {
        glyphs: Vec<ShapedGlyph>,
        size_hint: Option<CanvasSize>,
    }

    impl GlyphRun {
        pub fn new(glyphs: Vec<ShapedGlyph>) -> Self {
            Self {
                glyphs,
                size_hint: None,
            }
        }

        /// Pin the canvas to a fixed size instead of the computed one
        pub fn with_size_hint(mut self, hint: Option<CanvasSize>) -> Self {
            self.size_hint = hint;
            self
        }

        pub fn glyphs(&self) -> &[ShapedGlyph] {
            &self.glyphs
        }

        pub fn size_hint(&self) -> Option<CanvasSize> {
            self.size_hint
        }

        pub fn len(&self) -> usize {
            self.glyphs.len()
        }

        pub fn is_empty(&self) -> bool {
            self.glyphs.is_empty()
        }

        pub fn iter(&self) -> std::slice::Iter<'_, ShapedGlyph> {
            self.glyphs.iter()
        }

        /// Pen position at which each glyph is placed, starting from `origin`
        pub fn pen_positions(&self, origin: Point) -> Vec<Point> {
            let mut pen = origin;
            self.glyphs
                .iter()
                .map(|glyph| {
                    let at = pen;
                    pen += glyph.advance;
                    at
                })
                .collect()
        }
    }

    impl<'a> IntoIterator for &'a GlyphRun {
        type Item = &'a ShapedGlyph;
        type IntoIter = std::slice::Iter<'a, ShapedGlyph>;

        fn into_iter(self) -> Self::IntoIter {
            self.glyphs.iter()
        }
    }

    /// Ink box of one glyph relative to its origin, canvas orientation.
    ///
    /// `y_bearing` reaches from the baseline to the top ink edge, so it is
    /// negative for ink above the baseline. `width` and `height` are never
    /// negative.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct InkExtents {
        pub x_bearing: F26Dot6,
        pub y_bearing: F26Dot6,
        pub width: F26Dot6,
        pub height: F26Dot6,
    }

    /// How coverage bytes are laid out in a bitmap
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CoverageFormat {
        /// One byte per pixel, 0 = no ink, 255 = full ink
        Gray8,
        /// One bit per pixel
        Mono1,
        /// Three bytes per pixel, horizontal subpixel coverage
        Lcd,
        /// Premultiplied color
        Bgra8,
    }

    /// A rasterized glyph, borrowed from the rasterizer's scratch buffer.
    ///
    /// Lives only until the next rasterizer call on the same buffer.
    #[derive(Debug, Clone, Copy)]
    pub struct CoverageBitmap<'a> {
        /// Distance from the pen to the left column
        pub left: i32,
        /// Distance from the baseline up to the top row
        pub top: i32,
        pub width: u32,
        pub height: u32,
        /// Bytes per row in `data`
        pub pitch: u32,
        pub format: CoverageFormat,
        pub data: &'a [u8],
    }

    impl<'a> CoverageBitmap<'a> {
        /// A bitmap with no pixels (whitespace, empty outlines)
        pub const fn empty() -> Self {
            Self {
                left: 0,
                top: 0,
                width: 0,
                height: 0,
                pitch: 0,
                format: CoverageFormat::Gray8,
                data: &[],
            }
        }

        pub fn is_empty(&self) -> bool {
            self.width == 0 || self.height == 0
        }

        /// Coverage bytes of one row, `width` long
        pub fn row(&self, y: u32) -> Option<&'a [u8]> {
            let start = (y as usize).checked_mul(self.pitch as usize)?;
            self.data.get(start..start.checked_add(self.width as usize)?)
        }
    }
}

/// Default pixel size
pub const DEFAULT_PIXEL_SIZE: u32 = 64;

/// Default font query
pub const DEFAULT_FONT_QUERY: &str = "sans:weight=bold";

/// Largest pixel size a face will be opened at
pub const MAX_PIXEL_SIZE: u32 = 16384;

/// What to render and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub text: String,
    pub pixel_size: u32,
    pub font_query: String,
    /// Blank pixels added on every side
    pub padding: u32,
    /// Fixed canvas size; ink outside it is clipped
    pub canvas_size: Option<CanvasSize>,
    /// Pen start before padding; defaults to the face's ascender line
    pub pen_origin: Option<Point>,
}

impl RenderRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn pixel_size(mut self, pixel_size: u32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn font_query(mut self, query: impl Into<String>) -> Self {
        self.font_query = query.into();
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn canvas_size(mut self, size: Option<CanvasSize>) -> Self {
        self.canvas_size = size;
        self
    }

    pub fn pen_origin(mut self, origin: Option<Point>) -> Self {
        self.pen_origin = origin;
        self
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            text: String::new(),
            pixel_size: DEFAULT_PIXEL_SIZE,
            font_query: DEFAULT_FONT_QUERY.to_string(),
            padding: 0,
            canvas_size: None,
            pen_origin: None,
        }
    }
}
