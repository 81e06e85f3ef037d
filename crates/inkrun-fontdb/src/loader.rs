// this_file: crates/inkrun-fontdb/src/loader.rs

//! Opening font files as sized faces

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use read_fonts::{FontRef, TableProvider};

use inkrun_core::{
    error::{FontLoadError, Result},
    fixed::F26Dot6,
    traits::{FaceHandle, FaceLoader},
    types::GlyphId,
    MAX_PIXEL_SIZE,
};

/// Largest font file we agree to read (50 MiB)
pub const MAX_FONT_SIZE: u64 = 50 * 1024 * 1024;

/// How many font files a loader keeps in memory by default
pub const DEFAULT_MAX_FILES: usize = 32;

/// Loads faces from font files
///
/// File bytes are read once per path and shared, read-only, by every face
/// opened from that path. Only files that parsed as a font are kept, and at
/// most `capacity` of them; the oldest goes first. Everything size-dependent
/// lives in the face.
pub struct FileFaceLoader {
    files: RwLock<FileCache>,
    max_files: usize,
}

#[derive(Default)]
struct FileCache {
    data: HashMap<PathBuf, Arc<[u8]>>,
    order: VecDeque<PathBuf>,
}

impl FileFaceLoader {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_FILES)
    }

    /// Keep at most `max_files` font files in memory (at least one)
    pub fn with_capacity(max_files: usize) -> Self {
        Self {
            files: RwLock::new(FileCache::default()),
            max_files: max_files.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_files
    }

    /// Number of distinct font files held in memory
    pub fn cached_files(&self) -> usize {
        self.files.read().data.len()
    }

    /// Forget every cached file; faces already handed out keep theirs
    pub fn clear(&self) {
        let mut files = self.files.write();
        files.data.clear();
        files.order.clear();
    }

    fn cached(&self, path: &Path) -> Option<Arc<[u8]>> {
        self.files.read().data.get(path).cloned()
    }

    fn remember(&self, path: PathBuf, data: Arc<[u8]>) {
        let mut files = self.files.write();
        if files.data.contains_key(&path) {
            return;
        }
        while files.data.len() >= self.max_files {
            let Some(oldest) = files.order.pop_front() else {
                break;
            };
            files.data.remove(&oldest);
            log::debug!("Evicted {} from the font file cache", oldest.display());
        }
        files.order.push_back(path.clone());
        files.data.insert(path, data);
    }
}

impl Default for FileFaceLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_font_file(path: &Path) -> Result<Arc<[u8]>> {
    let failed = |reason: String| FontLoadError::FaceLoadFailed {
        path: path.to_path_buf(),
        reason,
    };

    let size = fs::metadata(path).map_err(|e| failed(e.to_string()))?.len();
    if size > MAX_FONT_SIZE {
        return Err(failed(format!(
            "file is {} bytes, limit is {}",
            size, MAX_FONT_SIZE
        ))
        .into());
    }

    let data: Arc<[u8]> = fs::read(path).map_err(|e| failed(e.to_string()))?.into();
    log::debug!("Read {} ({} bytes)", path.display(), data.len());
    Ok(data)
}

impl FaceLoader for FileFaceLoader {
    fn name(&self) -> &'static str {
        "read-fonts"
    }

    fn load(&self, path: &Path, pixel_size: u32) -> Result<Box<dyn FaceHandle>> {
        let (file, face_index) = split_face_index(path);

        if let Some(data) = self.cached(&file) {
            return Ok(Box::new(LoadedFace::from_data(data, face_index, pixel_size, file)?));
        }

        let data = read_font_file(&file)?;
        let face = LoadedFace::from_data(data.clone(), face_index, pixel_size, file.clone())?;
        self.remember(file, data);
        Ok(Box::new(face))
    }

    fn release(&self, face: Box<dyn FaceHandle>) {
        if let Some(path) = face.path() {
            log::trace!("Released face {}", path.display());
        }
        drop(face);
    }
}

/// A face opened at one pixel size
pub struct LoadedFace {
    data: Arc<[u8]>,
    path: Option<PathBuf>,
    face_index: u32,
    pixel_size: u32,
    units_per_em: u16,
    ascender: F26Dot6,
}

impl LoadedFace {
    /// Validate `data` as a font and size it.
    ///
    /// The ascender comes from `hhea`, or from `OS/2` when `hhea` says zero.
    pub fn from_data(
        data: Arc<[u8]>,
        face_index: u32,
        pixel_size: u32,
        path: impl Into<Option<PathBuf>>,
    ) -> Result<Self> {
        let path = path.into();
        if pixel_size == 0 || pixel_size > MAX_PIXEL_SIZE {
            return Err(FontLoadError::InvalidPixelSize(pixel_size).into());
        }

        let failed = |reason: String| FontLoadError::FaceLoadFailed {
            path: path.clone().unwrap_or_default(),
            reason,
        };

        let font = FontRef::from_index(&data, face_index).map_err(|e| failed(e.to_string()))?;

        let units_per_em = font
            .head()
            .map(|head| head.units_per_em())
            .map_err(|e| failed(e.to_string()))?;
        if units_per_em == 0 {
            return Err(failed("units per em is zero".into()).into());
        }

        let hhea_ascender = font
            .hhea()
            .map(|hhea| hhea.ascender().to_i16())
            .unwrap_or(0);
        let ascender_units = if hhea_ascender != 0 {
            hhea_ascender
        } else {
            font.os2().map(|os2| os2.s_typo_ascender()).unwrap_or(0)
        };
        let ascender = F26Dot6::from_font_units(i32::from(ascender_units), pixel_size, units_per_em);

        Ok(Self {
            data,
            path,
            face_index,
            pixel_size,
            units_per_em,
            ascender,
        })
    }

    fn font_ref(&self) -> Option<FontRef<'_>> {
        FontRef::from_index(&self.data, self.face_index).ok()
    }

    /// The shared bytes this face reads from
    pub fn shared_data(&self) -> &Arc<[u8]> {
        &self.data
    }
}

impl FaceHandle for LoadedFace {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn face_index(&self) -> u32 {
        self.face_index
    }

    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn ascender(&self) -> F26Dot6 {
        self.ascender
    }

    fn glyph_id(&self, ch: char) -> Option<GlyphId> {
        self.font_ref()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch))
            .map(|gid| gid.to_u32())
            .filter(|&gid| gid != 0)
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Split `collection.ttc#2` into the file and the face index.
///
/// A path that exists as given is never split.
pub fn split_face_index(path: &Path) -> (PathBuf, u32) {
    if !path.exists() {
        if let Some((file, index)) = path.to_str().and_then(|s| s.rsplit_once('#')) {
            if let Ok(index) = index.parse::<u32>() {
                return (PathBuf::from(file), index);
            }
        }
    }
    (path.to_path_buf(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkrun_core::InkrunError;

    #[test]
    fn test_garbage_is_face_load_failed() {
        let data: Arc<[u8]> = vec![0u8; 100].into();
        let result = LoadedFace::from_data(data, 0, 64, PathBuf::from("junk.ttf"));
        match result {
            Err(InkrunError::FontLoad(FontLoadError::FaceLoadFailed { path, .. })) => {
                assert_eq!(path, PathBuf::from("junk.ttf"))
            },
            Err(e) => unreachable!("wrong error: {}", e),
            Ok(_) => unreachable!("garbage parsed as a font"),
        }
    }

    #[test]
    fn test_pixel_size_bounds() {
        for size in [0, MAX_PIXEL_SIZE + 1] {
            let data: Arc<[u8]> = Vec::new().into();
            assert!(matches!(
                LoadedFace::from_data(data, 0, size, None::<PathBuf>),
                Err(InkrunError::FontLoad(FontLoadError::InvalidPixelSize(s))) if s == size
            ));
        }
    }

    #[test]
    fn test_missing_file() {
        let loader = FileFaceLoader::new();
        let result = loader.load(Path::new("/nonexistent/inkrun/font.ttf"), 64);
        assert!(matches!(
            result,
            Err(InkrunError::FontLoad(FontLoadError::FaceLoadFailed { .. }))
        ));
        assert_eq!(loader.cached_files(), 0);
    }

    #[test]
    fn test_non_font_file_is_rejected_and_not_kept() {
        let manifest = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let loader = FileFaceLoader::new();
        assert!(loader.load(manifest, 64).is_err());
        assert!(loader.load(manifest, 32).is_err());
        assert_eq!(loader.cached_files(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest_file() {
        let loader = FileFaceLoader::with_capacity(2);
        let bytes = |b: u8| -> Arc<[u8]> { vec![b; 4].into() };

        loader.remember(PathBuf::from("a.ttf"), bytes(1));
        loader.remember(PathBuf::from("b.ttf"), bytes(2));
        loader.remember(PathBuf::from("a.ttf"), bytes(9));
        assert_eq!(loader.cached_files(), 2);
        assert_eq!(loader.cached(Path::new("a.ttf")).as_deref(), Some(&[1u8; 4][..]));

        loader.remember(PathBuf::from("c.ttf"), bytes(3));
        assert_eq!(loader.cached_files(), 2);
        assert!(loader.cached(Path::new("a.ttf")).is_none());
        assert!(loader.cached(Path::new("c.ttf")).is_some());

        loader.clear();
        assert_eq!(loader.cached_files(), 0);
    }

    #[test]
    fn test_capacity_has_a_floor() {
        assert_eq!(FileFaceLoader::with_capacity(0).capacity(), 1);
        assert_eq!(FileFaceLoader::new().capacity(), DEFAULT_MAX_FILES);
    }

    #[test]
    fn test_split_face_index() {
        assert_eq!(
            split_face_index(Path::new("/no/such/fonts.ttc#3")),
            (PathBuf::from("/no/such/fonts.ttc"), 3)
        );
        assert_eq!(
            split_face_index(Path::new("/no/such/font.ttf")),
            (PathBuf::from("/no/such/font.ttf"), 0)
        );
        assert_eq!(
            split_face_index(Path::new("/no/such/odd#name.ttf")),
            (PathBuf::from("/no/such/odd#name.ttf"), 0)
        );
    }
}
