//! Shaping against a real system font; skipped when none resolves.

use inkrun_core::traits::{FaceHandle, FaceLoader, FontResolver, ShapingEngine};
use inkrun_fontdb::{FileFaceLoader, SystemFontResolver};
use inkrun_shape_hr::HarfrustShaper;

fn sans_face(loader: &FileFaceLoader, pixel_size: u32) -> Option<Box<dyn FaceHandle>> {
    let path = match SystemFontResolver::new().find("sans") {
        Ok(path) => path,
        Err(e) => {
            eprintln!("skipping: {}", e);
            return None;
        },
    };
    match loader.load(&path, pixel_size) {
        Ok(face) => Some(face),
        Err(e) => {
            eprintln!("skipping: {}", e);
            None
        },
    }
}

#[test]
fn test_latin_maps_one_to_one() {
    let loader = FileFaceLoader::new();
    let Some(face) = sans_face(&loader, 64) else {
        return;
    };

    let glyphs = HarfrustShaper::new()
        .shape(face.as_ref(), "Hello")
        .expect("shape Hello");

    assert_eq!(glyphs.len(), 5);
    let expected: Vec<Option<u32>> = "Hello".chars().map(|c| face.glyph_id(c)).collect();
    let shaped: Vec<Option<u32>> = glyphs.iter().map(|g| Some(g.glyph_id)).collect();
    assert_eq!(shaped, expected);

    for glyph in &glyphs {
        assert!(glyph.advance.x > 0);
        assert_eq!(glyph.advance.y, 0);
    }
}

#[test]
fn test_advances_scale_with_pixel_size() {
    let loader = FileFaceLoader::new();
    let (Some(small), Some(large)) = (sans_face(&loader, 32), sans_face(&loader, 64)) else {
        return;
    };

    let shaper = HarfrustShaper::new();
    let width = |face: &dyn FaceHandle| -> i32 {
        shaper
            .shape(face, "M")
            .expect("shape M")
            .iter()
            .map(|g| g.advance.x)
            .sum()
    };

    let (w32, w64) = (width(small.as_ref()), width(large.as_ref()));
    assert!((w64 - 2 * w32).abs() <= 1, "32px: {}, 64px: {}", w32, w64);
}

#[test]
fn test_shaping_is_deterministic() {
    let loader = FileFaceLoader::new();
    let Some(face) = sans_face(&loader, 48) else {
        return;
    };

    let shaper = HarfrustShaper::new();
    let first = shaper.shape(face.as_ref(), "AVATAR Wave").expect("first");
    let second = shaper.shape(face.as_ref(), "AVATAR Wave").expect("second");
    assert_eq!(first, second);
}
