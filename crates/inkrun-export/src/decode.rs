//! Reading graymaps back into canvases
//!
//! Accepts both `P5` and `P2`. Header tokens may be separated by any
//! whitespace and `#` comments run to the end of the line. Sample values
//! are rescaled to 0..=255 when the file's maxval is smaller.

use inkrun_core::{
    error::{ExportError, Result},
    Canvas,
};

/// Parse a PGM file into a canvas
pub fn decode_pgm(bytes: &[u8]) -> Result<Canvas> {
    let mut header = Header::new(bytes);

    let binary = match header.token()? {
        b"P5" => true,
        b"P2" => false,
        other => {
            return Err(malformed(format!(
                "unknown magic {:?}",
                String::from_utf8_lossy(other)
            )))
        },
    };

    let width = header.number()?;
    let height = header.number()?;
    let maxval = header.number()?;
    if maxval == 0 || maxval > 255 {
        return Err(malformed(format!("maxval {} is outside 1..=255", maxval)));
    }

    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| malformed(format!("{}x{} overflows", width, height)))?;

    let samples = if binary {
        // exactly one whitespace byte separates the header from the raster
        let start = header.pos + 1;
        if header.pos >= bytes.len() || !bytes[header.pos].is_ascii_whitespace() {
            return Err(malformed("missing separator before raster data".into()));
        }
        let data = bytes.get(start..).unwrap_or_default();
        if data.len() != len {
            return Err(malformed(format!(
                "expected {} raster bytes, found {}",
                len,
                data.len()
            )));
        }
        data.to_vec()
    } else {
        // every sample needs at least two bytes of text
        let mut samples = Vec::with_capacity(len.min(bytes.len() / 2));
        for _ in 0..len {
            let sample = header.number()?;
            if sample > maxval {
                return Err(malformed(format!("sample {} above maxval {}", sample, maxval)));
            }
            samples.push(sample as u8);
        }
        if header.skip_blank() {
            return Err(malformed("trailing data after raster".into()));
        }
        samples
    };

    let pixels = if maxval == 255 {
        samples
    } else {
        samples
            .into_iter()
            .map(|s| {
                let s = u32::from(s);
                if s > maxval {
                    Err(malformed(format!("sample {} above maxval {}", s, maxval)))
                } else {
                    Ok(((s * 255 + maxval / 2) / maxval) as u8)
                }
            })
            .collect::<Result<Vec<u8>>>()?
    };

    Canvas::from_pixels(width, height, pixels)
}

fn malformed(reason: String) -> inkrun_core::InkrunError {
    ExportError::Malformed(reason).into()
}

/// Token reader over the text part of a PGM
struct Header<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Header<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Skip whitespace and comments; true if anything is left
    fn skip_blank(&mut self) -> bool {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while self.bytes.get(self.pos).is_some_and(|&c| c != b'\n') {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                return true;
            }
        }
        false
    }

    fn token(&mut self) -> Result<&'a [u8]> {
        if !self.skip_blank() {
            return Err(malformed("unexpected end of header".into()));
        }
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|&b| !b.is_ascii_whitespace() && b != b'#')
        {
            self.pos += 1;
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn number(&mut self) -> Result<u32> {
        let token = self.token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                malformed(format!(
                    "expected a number, found {:?}",
                    String::from_utf8_lossy(token)
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PgmExporter;
    use inkrun_core::{traits::Exporter, InkrunError};
    use proptest::prelude::*;

    fn is_malformed(result: Result<Canvas>) -> bool {
        matches!(result, Err(InkrunError::Export(ExportError::Malformed(_))))
    }

    #[test]
    fn test_decode_binary() {
        let canvas = decode_pgm(b"P5\n2 2\n255\n\x00\x10\x20\xff").expect("valid pgm");
        assert_eq!((canvas.width(), canvas.height()), (2, 2));
        assert_eq!(canvas.pixels(), &[0, 16, 32, 255]);
    }

    #[test]
    fn test_decode_with_comments() {
        let canvas = decode_pgm(b"P5 # made by hand\n# size next\n3\t1 255\n\x01\x02\x03")
            .expect("comments are allowed");
        assert_eq!(canvas.pixels(), &[1, 2, 3]);
    }

    #[test]
    fn test_decode_ascii_rescales() {
        let canvas = decode_pgm(b"P2\n3 1\n15\n0 15 5\n").expect("valid pgm");
        assert_eq!(canvas.pixels(), &[0, 255, 85]);
    }

    #[test]
    fn test_zero_sized() {
        let canvas = decode_pgm(b"P5\n0 0\n255\n").expect("empty raster");
        assert_eq!(canvas.pixels().len(), 0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(is_malformed(decode_pgm(b"")));
        assert!(is_malformed(decode_pgm(b"P6\n1 1\n255\n\x00\x00\x00")));
        assert!(is_malformed(decode_pgm(b"P5\n2 2\n255\n\x00\x00\x00")));
        assert!(is_malformed(decode_pgm(b"P5\n1 1\n255\n\x00\x00")));
        assert!(is_malformed(decode_pgm(b"P5\n1 1\n0\n\x00")));
        assert!(is_malformed(decode_pgm(b"P5\n1 1\n65535\n\x00\x00")));
        assert!(is_malformed(decode_pgm(b"P2\n1 1\n255\n7 8\n")));
        assert!(is_malformed(decode_pgm(b"P2\n1 1\n9\n10\n")));
        assert!(is_malformed(decode_pgm(b"P5\nwide 1\n255\n\x00")));
    }

    proptest! {
        #[test]
        fn exported_canvases_decode_unchanged(
            width in 0u32..12,
            height in 0u32..12,
            seed in any::<u8>(),
            ascii in any::<bool>(),
        ) {
            let pixels: Vec<u8> = (0..width * height)
                .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
                .collect();
            let canvas = Canvas::from_pixels(width, height, pixels).expect("fixture");
            let exporter = if ascii { PgmExporter::ascii() } else { PgmExporter::binary() };
            let bytes = exporter.export(&canvas).expect("export");
            let decoded = decode_pgm(&bytes).expect("decode");
            prop_assert_eq!(decoded, canvas);
        }
    }
}
