// this_file: crates/inkrun-fontdb/src/resolver.rs

//! Font query resolution against the system font database

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use inkrun_core::{
    error::{FontLoadError, Result},
    traits::FontResolver,
};

use crate::loader::split_face_index;
use crate::query::{FamilySpec, FontQuery, GenericFamily, Slant};

/// Resolves queries like `sans:weight=bold` to font files
///
/// The font database is scanned on first use, not on construction, and
/// each resolved query is remembered for the lifetime of the resolver.
pub struct SystemFontResolver {
    db: OnceCell<Database>,
    font_dirs: Vec<PathBuf>,
    font_files: Vec<PathBuf>,
    system_fonts: bool,
    resolved: RwLock<HashMap<String, PathBuf>>,
}

impl SystemFontResolver {
    pub fn new() -> Self {
        Self {
            db: OnceCell::new(),
            font_dirs: Vec::new(),
            font_files: Vec::new(),
            system_fonts: true,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Also search every font in `dir`
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Also search one font file
    pub fn with_font_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.font_files.push(file.into());
        self
    }

    /// Only search the directories and files added explicitly
    pub fn without_system_fonts(mut self) -> Self {
        self.system_fonts = false;
        self
    }

    /// Number of faces known to the database, scanning it if needed
    pub fn face_count(&self) -> usize {
        self.database().len()
    }

    fn database(&self) -> &Database {
        self.db.get_or_init(|| {
            let mut db = Database::new();
            if self.system_fonts {
                db.load_system_fonts();
            }
            for dir in &self.font_dirs {
                db.load_fonts_dir(dir);
            }
            for file in &self.font_files {
                if let Err(e) = db.load_font_file(file) {
                    log::warn!("Skipping font file {}: {}", file.display(), e);
                }
            }
            alias_generic_families(&mut db);
            log::debug!("Font database ready with {} faces", db.len());
            db
        })
    }

    fn lookup(&self, query: &str) -> Result<PathBuf> {
        let not_found = || FontLoadError::NotFound {
            query: query.to_string(),
        };

        let parsed: FontQuery = query.parse()?;
        let db = self.database();

        let families: Vec<Family<'_>> = parsed
            .families
            .iter()
            .map(|spec| match spec {
                FamilySpec::Generic(GenericFamily::SansSerif) => Family::SansSerif,
                FamilySpec::Generic(GenericFamily::Serif) => Family::Serif,
                FamilySpec::Generic(GenericFamily::Monospace) => Family::Monospace,
                FamilySpec::Generic(GenericFamily::Cursive) => Family::Cursive,
                FamilySpec::Generic(GenericFamily::Fantasy) => Family::Fantasy,
                FamilySpec::Named(name) => Family::Name(name.as_str()),
            })
            .collect();

        let id = db
            .query(&Query {
                families: &families,
                weight: Weight(parsed.weight),
                stretch: Stretch::Normal,
                style: match parsed.slant {
                    Slant::Roman => Style::Normal,
                    Slant::Italic => Style::Italic,
                    Slant::Oblique => Style::Oblique,
                },
            })
            .ok_or_else(not_found)?;

        let face = db.face(id).ok_or_else(not_found)?;
        let path = match &face.source {
            Source::File(path) | Source::SharedFile(path, _) => path.clone(),
            Source::Binary(_) => return Err(not_found().into()),
        };

        Ok(with_face_index(&path, face.index))
    }
}

impl Default for SystemFontResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FontResolver for SystemFontResolver {
    fn name(&self) -> &'static str {
        "fontdb"
    }

    fn find(&self, query: &str) -> Result<PathBuf> {
        if let Some(path) = self.resolved.read().get(query) {
            return Ok(path.clone());
        }

        // A path, with or without a face index, needs no database
        let (file, _) = split_face_index(Path::new(query));
        if file.is_file() {
            return Ok(PathBuf::from(query));
        }

        let path = self.lookup(query)?;
        log::debug!("Font query '{}' matched {}", query, path.display());
        self.resolved.write().insert(query.to_string(), path.clone());
        Ok(path)
    }
}

/// Point each generic family at the first installed candidate
fn alias_generic_families(db: &mut Database) {
    let installed = |name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };

    let pick = |generic: GenericFamily| {
        generic
            .candidates()
            .iter()
            .find(|name| installed(name))
            .map(|name| name.to_string())
    };

    let sans = pick(GenericFamily::SansSerif);
    let serif = pick(GenericFamily::Serif);
    let mono = pick(GenericFamily::Monospace);
    let cursive = pick(GenericFamily::Cursive);
    let fantasy = pick(GenericFamily::Fantasy);

    if let Some(name) = sans {
        db.set_sans_serif_family(name);
    }
    if let Some(name) = serif {
        db.set_serif_family(name);
    }
    if let Some(name) = mono {
        db.set_monospace_family(name);
    }
    if let Some(name) = cursive {
        db.set_cursive_family(name);
    }
    if let Some(name) = fantasy {
        db.set_fantasy_family(name);
    }
}

/// `font.ttc` for the first face, `font.ttc#N` otherwise
pub(crate) fn with_face_index(path: &Path, index: u32) -> PathBuf {
    if index == 0 {
        return path.to_path_buf();
    }
    let mut tagged = OsString::from(path.as_os_str());
    tagged.push(format!("#{}", index));
    PathBuf::from(tagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkrun_core::InkrunError;

    fn isolated() -> SystemFontResolver {
        SystemFontResolver::new().without_system_fonts()
    }

    #[test]
    fn test_empty_database_finds_nothing() {
        let resolver = isolated();
        match resolver.find("sans:weight=bold") {
            Err(InkrunError::FontLoad(FontLoadError::NotFound { query })) => {
                assert_eq!(query, "sans:weight=bold")
            },
            other => unreachable!("expected NotFound, got {:?}", other),
        }
        assert_eq!(resolver.face_count(), 0);
    }

    #[test]
    fn test_existing_file_is_returned_as_is() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let resolver = isolated();
        match resolver.find(manifest) {
            Ok(path) => assert_eq!(path, PathBuf::from(manifest)),
            Err(e) => unreachable!("file path should resolve: {}", e),
        }
        // and the database was never scanned
        assert!(resolver.db.get().is_none());
    }

    #[test]
    fn test_collection_path_with_face_index_is_returned_as_is() {
        let query = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml#1");
        let resolver = isolated();
        match resolver.find(query) {
            Ok(path) => {
                assert_eq!(path, PathBuf::from(query));
                assert_eq!(split_face_index(&path).1, 1);
            },
            Err(e) => unreachable!("indexed file path should resolve: {}", e),
        }
        assert!(resolver.db.get().is_none());
    }

    #[test]
    fn test_malformed_query_is_not_found() {
        assert!(matches!(
            isolated().find("sans:weight=nope"),
            Err(InkrunError::FontLoad(FontLoadError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_face_index_suffix() {
        assert_eq!(with_face_index(Path::new("/f/a.ttc"), 0), PathBuf::from("/f/a.ttc"));
        assert_eq!(with_face_index(Path::new("/f/a.ttc"), 2), PathBuf::from("/f/a.ttc#2"));
    }
}
