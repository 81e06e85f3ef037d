// this_file: crates/inkrun-core/src/context.rs

//! The per-job container that carries data through pipeline stages

use std::sync::Arc;

use crate::{
    bbox::CanvasLayout,
    canvas::Canvas,
    error::{InkrunError, Result},
    pipeline::PipelineState,
    traits::{FaceHandle, FaceLoader, FontResolver, GlyphRasterizer, ShapingEngine},
    types::GlyphRun,
    RenderRequest,
};

/// A loaded face that goes back to its loader exactly once.
///
/// Dropping the guard releases the face, whether the job finished, failed
/// halfway, or unwound.
pub struct FaceGuard {
    loader: Arc<dyn FaceLoader>,
    face: Option<Box<dyn FaceHandle>>,
}

impl FaceGuard {
    pub fn new(loader: Arc<dyn FaceLoader>, face: Box<dyn FaceHandle>) -> Self {
        Self {
            loader,
            face: Some(face),
        }
    }

    pub fn face(&self) -> Option<&dyn FaceHandle> {
        self.face.as_deref()
    }
}

impl Drop for FaceGuard {
    fn drop(&mut self) {
        if let Some(face) = self.face.take() {
            log::trace!("Releasing face via {}", self.loader.name());
            self.loader.release(face);
        }
    }
}

/// Everything one render job owns
///
/// Each stage reads what earlier stages left here and stores its own
/// results. Nothing in a context is shared with another job.
pub struct PipelineContext {
    // What we start with
    request: RenderRequest,
    state: PipelineState,

    // Who does the work
    resolver: Option<Arc<dyn FontResolver>>,
    loader: Option<Arc<dyn FaceLoader>>,
    shaper: Option<Arc<dyn ShapingEngine>>,
    rasterizer: Option<Arc<dyn GlyphRasterizer>>,

    // What emerges along the way
    face: Option<FaceGuard>,
    run: Option<GlyphRun>,
    layout: Option<CanvasLayout>,
    canvas: Option<Canvas>,
}

impl PipelineContext {
    pub fn new(request: RenderRequest) -> Self {
        Self {
            request,
            state: PipelineState::Uninitialized,
            resolver: None,
            loader: None,
            shaper: None,
            rasterizer: None,
            face: None,
            run: None,
            layout: None,
            canvas: None,
        }
    }

    // Read what's inside

    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn resolver(&self) -> Option<Arc<dyn FontResolver>> {
        self.resolver.clone()
    }

    pub fn loader(&self) -> Option<Arc<dyn FaceLoader>> {
        self.loader.clone()
    }

    pub fn shaper(&self) -> Option<Arc<dyn ShapingEngine>> {
        self.shaper.clone()
    }

    pub fn rasterizer(&self) -> Option<Arc<dyn GlyphRasterizer>> {
        self.rasterizer.clone()
    }

    pub fn face(&self) -> Option<&dyn FaceHandle> {
        self.face.as_ref().and_then(FaceGuard::face)
    }

    pub fn run(&self) -> Option<&GlyphRun> {
        self.run.as_ref()
    }

    pub fn layout(&self) -> Option<CanvasLayout> {
        self.layout
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    // Change what's inside

    pub fn set_resolver(&mut self, resolver: Arc<dyn FontResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn set_loader(&mut self, loader: Arc<dyn FaceLoader>) {
        self.loader = Some(loader);
    }

    pub fn set_shaper(&mut self, shaper: Arc<dyn ShapingEngine>) {
        self.shaper = Some(shaper);
    }

    pub fn set_rasterizer(&mut self, rasterizer: Arc<dyn GlyphRasterizer>) {
        self.rasterizer = Some(rasterizer);
    }

    pub fn set_face(&mut self, face: FaceGuard) {
        self.face = Some(face);
    }

    pub fn set_run(&mut self, run: GlyphRun) {
        self.run = Some(run);
    }

    pub fn set_layout(&mut self, layout: CanvasLayout) {
        self.layout = Some(layout);
    }

    pub fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = Some(canvas);
    }

    pub fn take_canvas(&mut self) -> Option<Canvas> {
        self.canvas.take()
    }

    pub fn take_run(&mut self) -> Option<GlyphRun> {
        self.run.take()
    }

    /// Hand the face back to its loader; a no-op once released
    pub fn release_face(&mut self) {
        self.face = None;
    }

    /// Move to `next`, refusing transitions the state machine doesn't have
    pub fn advance(&mut self, next: PipelineState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(InkrunError::Pipeline(format!(
                "Illegal transition {:?} -> {:?}",
                self.state, next
            )));
        }
        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Abandon the job: release the face and drop every partial result
    pub fn fail(&mut self) {
        self.release_face();
        self.run = None;
        self.layout = None;
        self.canvas = None;
        if !self.state.is_terminal() {
            self.state = PipelineState::Failed;
        }
    }
}
