//! CLI argument definitions using Clap v4

use clap::Parser;
use std::path::PathBuf;

use inkrun::{CanvasSize, DEFAULT_FONT_QUERY, DEFAULT_PIXEL_SIZE};

/// Render one line of text into a grayscale PGM image
#[derive(Parser, Debug)]
#[command(name = "inkrun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Text to render
    pub text: String,

    /// Font query (`family[,family]:weight=..:slant=..`) or a font file path
    #[arg(short = 'f', long = "font", default_value = DEFAULT_FONT_QUERY)]
    pub font: String,

    /// Font size in pixels
    #[arg(short = 's', long = "size", default_value_t = DEFAULT_PIXEL_SIZE)]
    pub size: u32,

    /// Blank pixels around the ink
    #[arg(short = 'p', long = "padding", default_value_t = 0)]
    pub padding: u32,

    /// Fixed canvas size as <width>x<height>; ink outside is clipped
    #[arg(short = 'W', long = "canvas", value_parser = parse_canvas_size)]
    pub canvas: Option<CanvasSize>,

    /// Output file path
    #[arg(short = 'o', long = "output", default_value = "out.pgm")]
    pub output: PathBuf,

    /// Write plain-text PGM (P2) instead of binary (P5)
    #[arg(long = "ascii")]
    pub ascii: bool,

    /// Extra directory to search for fonts (repeatable)
    #[arg(long = "font-dir")]
    pub font_dirs: Vec<PathBuf>,

    /// Only search the directories given with --font-dir
    #[arg(long = "no-system-fonts")]
    pub no_system_fonts: bool,

    /// Print the shaped glyphs as JSON instead of rendering
    #[arg(long = "dump-glyphs")]
    pub dump_glyphs: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_canvas_size(spec: &str) -> Result<CanvasSize, String> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected <width>x<height>, got '{}'", spec))?;

    let parse = |part: &str, what: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid {} '{}' in '{}'", what, part, spec))
    };

    Ok(CanvasSize::new(parse(w, "width")?, parse(h, "height")?))
}
