//! The contracts between the pipeline and its backends
//!
//! The core never touches font files, shaping tables or outlines itself.
//! Each of those jobs sits behind one of these traits, so a backend can be
//! swapped without touching the pipeline.
//!
//! ## The Players
//!
//! - [`FontResolver`] - turns a font query into a file path
//! - [`FaceLoader`] - opens a face at a pixel size, and takes it back
//! - [`FaceHandle`] - the opened face as the other backends see it
//! - [`ShapingEngine`] - where characters become glyphs
//! - [`GlyphRasterizer`] - where glyphs become coverage
//! - [`Exporter`] - where canvases become bytes
//! - [`Stage`] - one transition of the render state machine

use std::path::{Path, PathBuf};

use crate::{
    canvas::Canvas,
    context::PipelineContext,
    error::Result,
    fixed::F26Dot6,
    pipeline::PipelineState,
    types::{CoverageBitmap, GlyphId, InkExtents, ShapedGlyph},
};

/// One transition of the render state machine
///
/// ```ignore
/// struct Sizing;
///
/// impl Stage for Sizing {
///     fn name(&self) -> &'static str {
///         "Sizing"
///     }
///
///     fn target(&self) -> PipelineState {
///         PipelineState::Sized
///     }
///
///     fn process(&self, context: &mut PipelineContext) -> Result<()> {
///         // read what earlier stages left behind, store what this one adds
///         Ok(())
///     }
/// }
/// ```
pub trait Stage: Send + Sync {
    /// Used in logs
    fn name(&self) -> &'static str;

    /// The state a job is in once this stage succeeds
    fn target(&self) -> PipelineState;

    /// Do the work, leaving the results in the context
    fn process(&self, context: &mut PipelineContext) -> Result<()>;
}

/// Maps a textual font query to a font file
pub trait FontResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fails with `FontLoadError::NotFound` when nothing matches
    fn find(&self, query: &str) -> Result<PathBuf>;
}

/// Opens font files as faces at a fixed pixel size
///
/// Every face handed out by [`FaceLoader::load`] comes back exactly once
/// through [`FaceLoader::release`].
pub trait FaceLoader: Send + Sync {
    fn name(&self) -> &'static str;

    /// Open `path` at `pixel_size` pixels per em
    fn load(&self, path: &Path, pixel_size: u32) -> Result<Box<dyn FaceHandle>>;

    /// Give a face back. The default just drops it.
    fn release(&self, face: Box<dyn FaceHandle>) {
        drop(face);
    }
}

/// An opened face, owned by a single render job
///
/// Font bytes may be shared between faces, anything mutable may not.
pub trait FaceHandle: Send {
    /// Raw font bytes as they live in the file
    fn data(&self) -> &[u8];

    /// Face index inside a collection (0 for single fonts)
    fn face_index(&self) -> u32 {
        0
    }

    /// Pixels per em this face was opened at
    fn pixel_size(&self) -> u32;

    /// The font's design grid
    fn units_per_em(&self) -> u16;

    /// Distance from the top of the line to the baseline at this size
    fn ascender(&self) -> F26Dot6;

    /// Returns None when the face has no glyph for this character
    fn glyph_id(&self, ch: char) -> Option<GlyphId>;

    /// Where the face came from, if it came from a file
    fn path(&self) -> Option<&Path> {
        None
    }
}

/// Where characters learn their positions
///
/// Script, direction and language detection are the engine's business.
/// Output is in visual order, in whole pixels, canvas orientation.
pub trait ShapingEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn shape(&self, face: &dyn FaceHandle, text: &str) -> Result<Vec<ShapedGlyph>>;
}

/// Where glyphs become coverage
///
/// The rasterizer keeps no per-call state of its own. Each render job owns a
/// scratch buffer and passes it in; the returned bitmap borrows that buffer,
/// so it has to be consumed before the next glyph is requested.
pub trait GlyphRasterizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Ink box of a glyph, or None when it has no outline (a space)
    fn extents(&self, face: &dyn FaceHandle, glyph_id: GlyphId) -> Option<InkExtents>;

    /// Render one glyph into `scratch`
    fn rasterize<'s>(
        &self,
        face: &dyn FaceHandle,
        glyph_id: GlyphId,
        scratch: &'s mut Vec<u8>,
    ) -> Result<CoverageBitmap<'s>>;
}

/// The final step: canvases become files
pub trait Exporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Encode the canvas as bytes
    fn export(&self, canvas: &Canvas) -> Result<Vec<u8>>;

    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;
}
