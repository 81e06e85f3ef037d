// this_file: crates/inkrun-export/src/lib.rs

//! Canvases out as Netpbm graymaps
//!
//! Binary PGM (`P5`) is the default: the header `P5\n<w> <h>\n255\n`
//! followed by the raw pixel bytes, top row first. ASCII PGM (`P2`) is
//! there for eyeballing small canvases in a text editor.

use std::io::Write;
use std::path::Path;

use inkrun_core::{
    error::{ExportError, Result},
    traits::Exporter,
    Canvas,
};

pub mod decode;

pub use decode::decode_pgm;

/// PGM exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct PgmExporter {
    encoding: PgmEncoding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PgmEncoding {
    /// `P5`, raw bytes
    #[default]
    Binary,
    /// `P2`, decimal text
    Ascii,
}

impl PgmExporter {
    pub fn new(encoding: PgmEncoding) -> Self {
        Self { encoding }
    }

    /// Binary `P5` exporter
    pub fn binary() -> Self {
        Self::new(PgmEncoding::Binary)
    }

    /// Plain-text `P2` exporter
    pub fn ascii() -> Self {
        Self::new(PgmEncoding::Ascii)
    }

    pub fn encoding(&self) -> PgmEncoding {
        self.encoding
    }

    /// Encode `canvas` and write it to `path`, replacing any existing file
    pub fn write_to(&self, canvas: &Canvas, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.export(canvas)?;
        std::fs::write(path, &bytes).map_err(|source| ExportError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Wrote {}x{} graymap to {} ({} bytes)",
            canvas.width(),
            canvas.height(),
            path.display(),
            bytes.len()
        );
        Ok(())
    }
}

impl Exporter for PgmExporter {
    fn name(&self) -> &'static str {
        match self.encoding {
            PgmEncoding::Binary => "pgm",
            PgmEncoding::Ascii => "pgm-ascii",
        }
    }

    fn export(&self, canvas: &Canvas) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(canvas.pixels().len() + 32);

        match self.encoding {
            PgmEncoding::Binary => {
                write!(&mut output, "P5\n{} {}\n255\n", canvas.width(), canvas.height())?;
                output.extend_from_slice(canvas.pixels());
            },
            PgmEncoding::Ascii => {
                write!(&mut output, "P2\n{} {}\n255\n", canvas.width(), canvas.height())?;
                if canvas.width() > 0 {
                    for row in canvas.pixels().chunks(canvas.width() as usize) {
                        let line: Vec<String> = row.iter().map(u8::to_string).collect();
                        writeln!(&mut output, "{}", line.join(" "))?;
                    }
                }
            },
        }

        Ok(output)
    }

    fn extension(&self) -> &'static str {
        "pgm"
    }

    fn mime_type(&self) -> &'static str {
        "image/x-portable-graymap"
    }
}
