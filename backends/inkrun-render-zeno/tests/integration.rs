//! Rasterizing real outlines; skipped when no system sans-serif resolves.

use inkrun_core::{
    traits::{FaceHandle, FaceLoader, FontResolver, GlyphRasterizer},
    types::CoverageFormat,
};
use inkrun_fontdb::{FileFaceLoader, SystemFontResolver};
use inkrun_render_zeno::ZenoRasterizer;

fn sans_face(pixel_size: u32) -> Option<Box<dyn FaceHandle>> {
    let loaded = SystemFontResolver::new()
        .find("sans")
        .and_then(|path| FileFaceLoader::new().load(&path, pixel_size));
    match loaded {
        Ok(face) => Some(face),
        Err(e) => {
            eprintln!("skipping: {}", e);
            None
        },
    }
}

#[test]
fn test_bitmap_matches_extents() {
    let Some(face) = sans_face(64) else {
        return;
    };
    let Some(glyph) = face.glyph_id('H') else {
        return;
    };

    let rasterizer = ZenoRasterizer::new();
    let ext = rasterizer.extents(face.as_ref(), glyph).expect("H has ink");
    let mut scratch = Vec::new();
    let bitmap = rasterizer
        .rasterize(face.as_ref(), glyph, &mut scratch)
        .expect("rasterize H");

    assert_eq!(bitmap.format, CoverageFormat::Gray8);
    assert_eq!(bitmap.left, ext.x_bearing.to_pixel_floor());
    assert_eq!(bitmap.top, -ext.y_bearing.to_pixel_floor());
    assert_eq!(
        bitmap.width as i32,
        (ext.x_bearing + ext.width).to_pixel_ceil() - ext.x_bearing.to_pixel_floor()
    );
    // H sits on the baseline and reaches well above it
    assert!(bitmap.top > 30);
    assert!(bitmap.data.iter().any(|&a| a == 255));
}

#[test]
fn test_space_is_empty() {
    let Some(face) = sans_face(64) else {
        return;
    };
    let Some(space) = face.glyph_id(' ') else {
        return;
    };

    let rasterizer = ZenoRasterizer::new();
    assert!(rasterizer.extents(face.as_ref(), space).is_none());

    let mut scratch = Vec::new();
    let bitmap = rasterizer
        .rasterize(face.as_ref(), space, &mut scratch)
        .expect("rasterize space");
    assert!(bitmap.is_empty());
}

#[test]
fn test_oversized_glyph_is_refused() {
    let Some(face) = sans_face(512) else {
        return;
    };
    let Some(glyph) = face.glyph_id('M') else {
        return;
    };

    let mut scratch = Vec::new();
    let result = ZenoRasterizer::with_max_size(16).rasterize(face.as_ref(), glyph, &mut scratch);
    assert!(result.is_err());
}

#[test]
fn test_scratch_is_reused() {
    let Some(face) = sans_face(48) else {
        return;
    };
    let rasterizer = ZenoRasterizer::new();
    let mut scratch = Vec::new();

    let mut sizes = Vec::new();
    for ch in ['W', 'i', 'W'] {
        let Some(glyph) = face.glyph_id(ch) else {
            return;
        };
        let bitmap = rasterizer
            .rasterize(face.as_ref(), glyph, &mut scratch)
            .expect("rasterize");
        sizes.push((bitmap.width, bitmap.height, bitmap.data.to_vec()));
    }
    assert_eq!(sizes[0], sizes[2]);
    assert_ne!(sizes[0].0, sizes[1].0);
}
