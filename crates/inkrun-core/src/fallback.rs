// this_file: crates/inkrun-core/src/fallback.rs

//! Replacement glyph substitution
//!
//! Characters the face cannot draw are swapped for `'?'` before shaping, so
//! the shaper sees (and measures) the replacement. If the face has no `'?'`
//! either, the job fails on the first character that needs it.
//!
//! Control characters are treated as missing even when the cmap lists them,
//! since shapers turn them into `.notdef`. Whatever `.notdef` still comes
//! out of the shaper is swapped for the `'?'` glyph afterwards.

use std::borrow::Cow;

use crate::error::{Result, ShapingError};
use crate::traits::FaceHandle;
use crate::types::{GlyphId, ShapedGlyph};

/// The glyph every font draws as its missing-character box
pub const NOTDEF: GlyphId = 0;

/// Stands in for characters the face lacks
pub const REPLACEMENT_CHAR: char = '?';

/// Format controls and variation selectors that shapers consume without
/// needing a glyph of their own
pub fn is_default_ignorable(ch: char) -> bool {
    matches!(
        ch,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2060}'..='\u{2064}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
    )
}

/// Replace every character `face` has no glyph for with [`REPLACEMENT_CHAR`].
///
/// Borrows the input untouched when nothing is missing.
pub fn substitute_missing<'t>(face: &dyn FaceHandle, text: &'t str) -> Result<Cow<'t, str>> {
    let needs_glyph = |ch: char| {
        !is_default_ignorable(ch) && (ch.is_control() || face.glyph_id(ch).is_none())
    };

    let Some(first_missing) = text.char_indices().find(|(_, ch)| needs_glyph(*ch)) else {
        return Ok(Cow::Borrowed(text));
    };

    if face.glyph_id(REPLACEMENT_CHAR).is_none() {
        return Err(ShapingError::GlyphMissingAndNoFallback {
            codepoint: first_missing.1,
        }
        .into());
    }

    let mut substituted = String::with_capacity(text.len());
    substituted.push_str(&text[..first_missing.0]);
    let mut replaced = 0usize;

    for ch in text[first_missing.0..].chars() {
        if needs_glyph(ch) {
            log::warn!(
                "No glyph for U+{:04X}, substituting '{}'",
                u32::from(ch),
                REPLACEMENT_CHAR
            );
            substituted.push(REPLACEMENT_CHAR);
            replaced += 1;
        } else {
            substituted.push(ch);
        }
    }

    log::debug!("Substituted {} missing character(s)", replaced);
    Ok(Cow::Owned(substituted))
}

/// Swap every `.notdef` the shaper produced for the face's `'?'` glyph
pub fn replace_notdef(face: &dyn FaceHandle, glyphs: &mut [ShapedGlyph]) -> Result<()> {
    let mut notdefs = glyphs.iter_mut().filter(|g| g.glyph_id == NOTDEF).peekable();
    if notdefs.peek().is_none() {
        return Ok(());
    }

    let replacement = face
        .glyph_id(REPLACEMENT_CHAR)
        .ok_or(ShapingError::GlyphMissingAndNoFallback {
            codepoint: REPLACEMENT_CHAR,
        })?;

    let mut replaced = 0usize;
    for glyph in notdefs {
        glyph.glyph_id = replacement;
        replaced += 1;
    }
    log::warn!(
        "Shaper produced {} .notdef glyph(s), substituting '{}'",
        replaced,
        REPLACEMENT_CHAR
    );
    Ok(())
}
