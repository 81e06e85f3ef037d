//! `--dump-glyphs` output

use serde::Serialize;

use inkrun::types::GlyphRun;
use inkrun::{InkrunError, RenderRequest, Result};

#[derive(Debug, Serialize)]
pub struct RunDump<'a> {
    pub text: &'a str,
    pub font: &'a str,
    pub pixel_size: u32,
    pub glyphs: Vec<GlyphDump>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GlyphDump {
    pub id: u32,
    /// Pen position before this glyph, origin at (0, 0)
    pub pen: [i32; 2],
    pub offset: [i32; 2],
    pub advance: [i32; 2],
}

impl<'a> RunDump<'a> {
    pub fn new(request: &'a RenderRequest, run: &GlyphRun) -> Self {
        let glyphs = run
            .iter()
            .zip(run.pen_positions(inkrun::Point::ORIGIN))
            .map(|(glyph, pen)| GlyphDump {
                id: glyph.glyph_id,
                pen: [pen.x, pen.y],
                offset: [glyph.offset.x, glyph.offset.y],
                advance: [glyph.advance.x, glyph.advance.y],
            })
            .collect();

        Self {
            text: &request.text,
            font: &request.font_query,
            pixel_size: request.pixel_size,
            glyphs,
        }
    }
}

/// Pretty-printed JSON for a shaped run
pub fn to_json(request: &RenderRequest, run: &GlyphRun) -> Result<String> {
    serde_json::to_string_pretty(&RunDump::new(request, run))
        .map_err(|e| InkrunError::Config(format!("JSON encoding failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkrun::types::ShapedGlyph;
    use inkrun::Point;

    #[test]
    fn test_pens_accumulate() {
        let request = RenderRequest::new("AV").pixel_size(32);
        let run = GlyphRun::new(vec![
            ShapedGlyph::new(36, Point::ORIGIN, Point::new(21, 0)),
            ShapedGlyph::new(57, Point::new(0, -1), Point::new(20, 0)),
        ]);

        let dump = RunDump::new(&request, &run);
        assert_eq!(dump.glyphs.len(), 2);
        assert_eq!(dump.glyphs[1].pen, [21, 0]);
        assert_eq!(dump.glyphs[1].offset, [0, -1]);
    }

    #[test]
    fn test_json_shape() {
        let request = RenderRequest::new("A");
        let run = GlyphRun::new(vec![ShapedGlyph::new(7, Point::ORIGIN, Point::new(40, 0))]);

        let json = to_json(&request, &run).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["text"], "A");
        assert_eq!(value["font"], "sans:weight=bold");
        assert_eq!(value["pixel_size"], 64);
        assert_eq!(value["glyphs"][0]["id"], 7);
        assert_eq!(value["glyphs"][0]["advance"][0], 40);
    }
}
