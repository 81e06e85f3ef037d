//! inkrun - a line of text in, a tight grayscale raster out
//!
//! The pipeline lives in [`inkrun_core`]; this crate wires it to the default
//! backends:
//!
//! 1. Font queries resolve through the system font database (fontdb)
//! 2. Faces are opened with read-fonts
//! 3. Text is shaped by harfrust
//! 4. Glyphs are rasterized by zeno
//! 5. Canvases are written as PGM
//!
//! # Example
//!
//! ```no_run
//! use inkrun::prelude::*;
//!
//! let pipeline = inkrun::default_pipeline()?;
//! let canvas = pipeline.render(&RenderRequest::new("Hello").padding(4))?;
//! inkrun::export::PgmExporter::binary().write_to(&canvas, "hello.pgm")?;
//! # Ok::<(), InkrunError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `fontdb`: system font resolution and face loading
//! - `shaping-hr`: harfrust shaping
//! - `render-zeno`: zeno rasterization
//! - `export-pgm`: PGM export and decoding
//!
//! [`default_pipeline`] needs the first three.

pub use inkrun_core::{
    error, traits, types, Canvas, CanvasSize, InkrunError, PipelineState, Point, RenderPipeline,
    RenderPipelineBuilder, RenderRequest, Result, DEFAULT_FONT_QUERY, DEFAULT_PIXEL_SIZE,
};

#[cfg(feature = "fontdb")]
pub use inkrun_fontdb as fontdb;

#[cfg(feature = "shaping-hr")]
pub use inkrun_shape_hr as shape_hr;

#[cfg(feature = "render-zeno")]
pub use inkrun_render_zeno as render_zeno;

#[cfg(feature = "export-pgm")]
pub use inkrun_export as export;

/// Common imports for typical usage
pub mod prelude {
    pub use inkrun_core::{
        error::{InkrunError, Result},
        traits::{Exporter, FaceLoader, FontResolver, GlyphRasterizer, ShapingEngine},
        types::{GlyphRun, ShapedGlyph},
        Canvas, CanvasSize, Point, RenderPipeline, RenderRequest,
    };
}

/// A pipeline on the default backends, searching the system fonts
#[cfg(all(feature = "fontdb", feature = "shaping-hr", feature = "render-zeno"))]
pub fn default_pipeline() -> Result<RenderPipeline> {
    pipeline_with_resolver(fontdb::SystemFontResolver::new())
}

/// A pipeline on the default backends with a custom font search
#[cfg(all(feature = "fontdb", feature = "shaping-hr", feature = "render-zeno"))]
pub fn pipeline_with_resolver(resolver: fontdb::SystemFontResolver) -> Result<RenderPipeline> {
    use std::sync::Arc;

    log::debug!("Building pipeline: fontdb, read-fonts, harfrust, zeno");
    RenderPipeline::builder()
        .resolver(Arc::new(resolver))
        .loader(Arc::new(fontdb::FileFaceLoader::new()))
        .shaper(Arc::new(shape_hr::HarfrustShaper::new()))
        .rasterizer(Arc::new(render_zeno::ZenoRasterizer::new()))
        .build()
}

#[cfg(all(
    test,
    feature = "fontdb",
    feature = "shaping-hr",
    feature = "render-zeno"
))]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_builds_without_scanning_fonts() {
        // the font database is only scanned by the first render
        assert!(default_pipeline().is_ok());
    }

    #[test]
    fn test_isolated_resolver_reports_missing_font() {
        let pipeline = pipeline_with_resolver(fontdb::SystemFontResolver::new().without_system_fonts())
            .expect("pipeline builds");
        let result = pipeline.render(&RenderRequest::new("A").font_query("sans"));
        assert!(matches!(
            result,
            Err(InkrunError::FontLoad(error::FontLoadError::NotFound { .. }))
        ));
    }
}
