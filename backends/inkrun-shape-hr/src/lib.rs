// this_file: backends/inkrun-shape-hr/src/lib.rs

//! Pure Rust text shaping backend using harfrust
//!
//! Script, direction and language are guessed from the text itself.
//! Positions come back from harfrust in font units; they are scaled to 26.6
//! at the face's pixel size, flipped to y-down and truncated to whole
//! pixels, glyph by glyph.

use harfrust::{FontRef as HrFontRef, ShaperData, UnicodeBuffer};

use inkrun_core::{
    error::{Result, ShapingError},
    fixed::F26Dot6,
    geometry::Point,
    traits::{FaceHandle, ShapingEngine},
    types::ShapedGlyph,
};

/// Text shaping powered by harfrust
#[derive(Debug, Default, Clone, Copy)]
pub struct HarfrustShaper;

impl HarfrustShaper {
    pub fn new() -> Self {
        Self
    }

    /// A y-up font-unit displacement as whole canvas pixels
    fn to_canvas(x: i32, y: i32, pixel_size: u32, upem: u16) -> Point {
        let px = |units: i32| F26Dot6::from_font_units(units, pixel_size, upem);
        Point::new(px(x).to_pixel_truncate(), (-px(y)).to_pixel_truncate())
    }
}

impl ShapingEngine for HarfrustShaper {
    fn name(&self) -> &'static str {
        "Harfrust"
    }

    fn shape(&self, face: &dyn FaceHandle, text: &str) -> Result<Vec<ShapedGlyph>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let hr_font = HrFontRef::from_index(face.data(), face.face_index())
            .map_err(|e| ShapingError::Backend(format!("Font data rejected: {}", e)))?;

        let shaper_data = ShaperData::new(&hr_font);
        let shaper = shaper_data
            .shaper(&hr_font)
            .point_size(Some(face.pixel_size() as f32))
            .build();

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let output = shaper.shape(buffer, &[]);

        let pixel_size = face.pixel_size();
        let upem = face.units_per_em();
        let glyphs: Vec<ShapedGlyph> = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| {
                ShapedGlyph::new(
                    info.glyph_id,
                    Self::to_canvas(pos.x_offset, pos.y_offset, pixel_size, upem),
                    Self::to_canvas(pos.x_advance, pos.y_advance, pixel_size, upem),
                )
            })
            .collect();

        log::trace!("Harfrust shaped {} chars into {} glyphs", text.chars().count(), glyphs.len());
        Ok(glyphs)
    }
}
