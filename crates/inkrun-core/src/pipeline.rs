// this_file: crates/inkrun-core/src/pipeline.rs

//! The engine that drives one render job through its states
//!
//! ```text
//! Uninitialized -> FaceLoaded -> Shaped -> Sized -> Rendered -> Done
//!        \______________\___________\________\_________\-----> Failed
//! ```
//!
//! Each arrow is a [`Stage`]. A failing stage sends the job to `Failed`,
//! which releases the face and throws away everything built so far.

use std::sync::Arc;

use crate::{
    bbox::{canvas_layout, ink_bounds, CanvasLayout},
    canvas::Canvas,
    compositor::GlyphCompositor,
    context::{FaceGuard, PipelineContext},
    error::{FontLoadError, InkrunError, Result},
    fallback::{replace_notdef, substitute_missing},
    geometry::{BoundingRect, Point},
    traits::{FaceLoader, FontResolver, GlyphRasterizer, ShapingEngine, Stage},
    types::GlyphRun,
    RenderRequest, MAX_PIXEL_SIZE,
};

/// Where a render job stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Uninitialized,
    FaceLoaded,
    Shaped,
    Sized,
    Rendered,
    Done,
    Failed,
}

impl PipelineState {
    /// `Done` and `Failed` end a job
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// The single forward step from here, if any
    pub fn successor(self) -> Option<PipelineState> {
        use PipelineState::*;
        match self {
            Uninitialized => Some(FaceLoaded),
            FaceLoaded => Some(Shaped),
            Shaped => Some(Sized),
            Sized => Some(Rendered),
            Rendered => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn can_advance_to(self, next: PipelineState) -> bool {
        match next {
            PipelineState::Failed => !self.is_terminal(),
            _ => self.successor() == Some(next),
        }
    }
}

/// Text in, canvas out
///
/// Holds the four backends and nothing else; every call to [`render`]
/// gets its own [`PipelineContext`], so one pipeline can serve many
/// threads at once.
///
/// ```ignore
/// use inkrun_core::{RenderPipeline, RenderRequest};
///
/// let pipeline = RenderPipeline::builder()
///     .resolver(Arc::new(SystemFontResolver::new()))
///     .loader(Arc::new(FileFaceLoader::new()))
///     .shaper(Arc::new(HarfrustShaper::new()))
///     .rasterizer(Arc::new(ZenoRasterizer::new()))
///     .build()?;
///
/// let canvas = pipeline.render(&RenderRequest::new("AB"))?;
/// ```
///
/// [`render`]: RenderPipeline::render
pub struct RenderPipeline {
    stages: Vec<Box<dyn Stage>>,
    resolver: Arc<dyn FontResolver>,
    loader: Arc<dyn FaceLoader>,
    shaper: Arc<dyn ShapingEngine>,
    rasterizer: Arc<dyn GlyphRasterizer>,
}

impl RenderPipeline {
    pub fn builder() -> RenderPipelineBuilder {
        RenderPipelineBuilder::new()
    }

    /// Render `request` onto a fresh canvas.
    ///
    /// On any failure the face is released and no canvas comes back.
    pub fn render(&self, request: &RenderRequest) -> Result<Canvas> {
        let mut context = self.prepare(request);

        let result = self
            .run_until(&mut context, PipelineState::Rendered)
            .and_then(|()| {
                context.release_face();
                context.advance(PipelineState::Done)?;
                let canvas = context
                    .take_canvas()
                    .ok_or_else(|| InkrunError::Pipeline("No canvas after rendering".into()))?;
                log::info!(
                    "Rendered {:?} onto a {}x{} canvas",
                    request.text,
                    canvas.width(),
                    canvas.height()
                );
                Ok(canvas)
            });

        if result.is_err() {
            context.fail();
        }
        result
    }

    /// Load and shape only, handing back the positioned glyphs
    pub fn shape(&self, request: &RenderRequest) -> Result<GlyphRun> {
        let mut context = self.prepare(request);

        let result = self
            .run_until(&mut context, PipelineState::Shaped)
            .and_then(|()| {
                context
                    .take_run()
                    .ok_or_else(|| InkrunError::Pipeline("No glyph run after shaping".into()))
            });

        if result.is_err() {
            context.fail();
        }
        result
    }

    fn prepare(&self, request: &RenderRequest) -> PipelineContext {
        let mut context = PipelineContext::new(request.clone());
        context.set_resolver(self.resolver.clone());
        context.set_loader(self.loader.clone());
        context.set_shaper(self.shaper.clone());
        context.set_rasterizer(self.rasterizer.clone());
        context
    }

    fn run_until(&self, context: &mut PipelineContext, until: PipelineState) -> Result<()> {
        for stage in &self.stages {
            log::debug!("Executing stage: {}", stage.name());
            if let Err(e) = stage.process(context) {
                log::debug!("Stage {} failed: {}", stage.name(), e);
                return Err(e);
            }
            context.advance(stage.target())?;
            if stage.target() == until {
                break;
            }
        }
        Ok(())
    }
}

/// Assemble a pipeline from its four backends
///
/// All four are required; [`build`](RenderPipelineBuilder::build) reports
/// the first one missing.
#[derive(Default)]
pub struct RenderPipelineBuilder {
    resolver: Option<Arc<dyn FontResolver>>,
    loader: Option<Arc<dyn FaceLoader>>,
    shaper: Option<Arc<dyn ShapingEngine>>,
    rasterizer: Option<Arc<dyn GlyphRasterizer>>,
}

impl RenderPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose who turns font queries into files
    pub fn resolver(mut self, resolver: Arc<dyn FontResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Choose who opens and releases faces
    pub fn loader(mut self, loader: Arc<dyn FaceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Choose who turns characters into glyphs
    pub fn shaper(mut self, shaper: Arc<dyn ShapingEngine>) -> Self {
        self.shaper = Some(shaper);
        self
    }

    /// Choose who turns glyphs into coverage
    pub fn rasterizer(mut self, rasterizer: Arc<dyn GlyphRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn build(self) -> Result<RenderPipeline> {
        let missing = |what: &str| InkrunError::Config(format!("No {} configured", what));

        Ok(RenderPipeline {
            stages: vec![
                Box::new(FaceLoadingStage) as Box<dyn Stage>,
                Box::new(ShapingStage) as Box<dyn Stage>,
                Box::new(SizingStage) as Box<dyn Stage>,
                Box::new(CompositingStage) as Box<dyn Stage>,
            ],
            resolver: self.resolver.ok_or_else(|| missing("font resolver"))?,
            loader: self.loader.ok_or_else(|| missing("face loader"))?,
            shaper: self.shaper.ok_or_else(|| missing("shaper"))?,
            rasterizer: self.rasterizer.ok_or_else(|| missing("rasterizer"))?,
        })
    }
}

fn missing_input(what: &str) -> InkrunError {
    InkrunError::Pipeline(format!("No {} available", what))
}

struct FaceLoadingStage;
impl Stage for FaceLoadingStage {
    fn name(&self) -> &'static str {
        "FaceLoading"
    }

    fn target(&self) -> PipelineState {
        PipelineState::FaceLoaded
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let resolver = context.resolver().ok_or_else(|| missing_input("font resolver"))?;
        let loader = context.loader().ok_or_else(|| missing_input("face loader"))?;
        let request = context.request();

        if request.pixel_size == 0 || request.pixel_size > MAX_PIXEL_SIZE {
            return Err(FontLoadError::InvalidPixelSize(request.pixel_size).into());
        }

        let path = resolver.find(&request.font_query)?;
        log::debug!(
            "Resolved '{}' to {} with backend: {}",
            request.font_query,
            path.display(),
            resolver.name()
        );

        let face = loader.load(&path, request.pixel_size)?;
        context.set_face(FaceGuard::new(loader, face));
        Ok(())
    }
}

struct ShapingStage;
impl Stage for ShapingStage {
    fn name(&self) -> &'static str {
        "Shaping"
    }

    fn target(&self) -> PipelineState {
        PipelineState::Shaped
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let shaper = context.shaper().ok_or_else(|| missing_input("shaper"))?;

        let run = {
            let face = context.face().ok_or_else(|| missing_input("face"))?;
            let request = context.request();
            let text = substitute_missing(face, &request.text)?;

            log::debug!("Shaping text with backend: {}", shaper.name());
            let mut glyphs = shaper.shape(face, &text)?;
            replace_notdef(face, &mut glyphs)?;
            GlyphRun::new(glyphs).with_size_hint(request.canvas_size)
        };

        log::debug!("Shaped {} glyph(s)", run.len());
        context.set_run(run);
        Ok(())
    }
}

struct SizingStage;
impl Stage for SizingStage {
    fn name(&self) -> &'static str {
        "Sizing"
    }

    fn target(&self) -> PipelineState {
        PipelineState::Sized
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let rasterizer = context.rasterizer().ok_or_else(|| missing_input("rasterizer"))?;

        let layout = {
            let face = context.face().ok_or_else(|| missing_input("face"))?;
            let run = context.run().ok_or_else(|| missing_input("glyph run"))?;
            let request = context.request();

            let bounds = ink_bounds(run.glyphs(), |id| rasterizer.extents(face, id));

            // Baseline sits one ascender down, unless there is nothing to draw
            let pen_origin = request.pen_origin.unwrap_or_else(|| match bounds {
                Some(_) => Point::new(0, face.ascender().to_pixel_ceil()),
                None => Point::ORIGIN,
            });

            let layout = canvas_layout(
                &bounds.unwrap_or(BoundingRect::EMPTY),
                pen_origin,
                request.padding,
            );
            CanvasLayout {
                size: run.size_hint().unwrap_or(layout.size),
                ..layout
            }
        };

        log::debug!(
            "Canvas {}x{}, pen at ({},{})",
            layout.size.width,
            layout.size.height,
            layout.pen.x,
            layout.pen.y
        );

        context.set_layout(layout);
        Ok(())
    }
}

struct CompositingStage;
impl Stage for CompositingStage {
    fn name(&self) -> &'static str {
        "Compositing"
    }

    fn target(&self) -> PipelineState {
        PipelineState::Rendered
    }

    fn process(&self, context: &mut PipelineContext) -> Result<()> {
        let rasterizer = context.rasterizer().ok_or_else(|| missing_input("rasterizer"))?;
        let layout = context.layout().ok_or_else(|| missing_input("canvas layout"))?;
        let mut canvas = Canvas::create(layout.size.width, layout.size.height)?;

        {
            let face = context.face().ok_or_else(|| missing_input("face"))?;
            let run = context.run().ok_or_else(|| missing_input("glyph run"))?;

            log::debug!("Compositing with backend: {}", rasterizer.name());
            GlyphCompositor::new(rasterizer.as_ref()).composite(&mut canvas, face, run, layout.pen)?;
        }

        context.set_canvas(canvas);
        Ok(())
    }
}
