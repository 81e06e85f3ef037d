//! Error types for inkrun

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CoverageFormat, GlyphId};

pub type Result<T> = std::result::Result<T, InkrunError>;

/// Main error type for inkrun
#[derive(Debug, Error)]
pub enum InkrunError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Shaping failed: {0}")]
    Shaping(#[from] ShapingError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Font resolution and face loading errors
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("No font matches query '{query}'")]
    NotFound { query: String },

    #[error("Could not load face from {}: {reason}", path.display())]
    FaceLoadFailed { path: PathBuf, reason: String },

    #[error("Invalid pixel size: {0}")]
    InvalidPixelSize(u32),
}

/// Shaping errors
#[derive(Debug, Error)]
pub enum ShapingError {
    #[error("No glyph for codepoint U+{:04X} and no fallback '?'", u32::from(*codepoint))]
    GlyphMissingAndNoFallback { codepoint: char },

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Rasterization and compositing errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported coverage format: {0:?}")]
    UnsupportedPixelFormat(CoverageFormat),

    #[error("Rasterizing glyph {glyph_id} failed: {reason}")]
    RasterizeFailed { glyph_id: GlyphId, reason: String },

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Writing {} failed: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed raster data: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_glyph_message_names_codepoint() {
        let err: InkrunError = ShapingError::GlyphMissingAndNoFallback { codepoint: 'é' }.into();
        assert_eq!(
            err.to_string(),
            "Shaping failed: No glyph for codepoint U+00E9 and no fallback '?'"
        );
    }

    #[test]
    fn test_nested_errors_convert() {
        let err: InkrunError = RenderError::InvalidDimensions {
            width: 3,
            height: 4,
        }
        .into();
        assert!(matches!(
            err,
            InkrunError::Render(RenderError::InvalidDimensions {
                width: 3,
                height: 4
            })
        ));
    }
}
