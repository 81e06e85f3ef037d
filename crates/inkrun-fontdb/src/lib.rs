//! Where fonts come from: query resolution and face loading for inkrun
//!
//! [`SystemFontResolver`] turns a fontconfig-style query such as
//! `sans:weight=bold` into a file on disk using the system font database.
//! [`FileFaceLoader`] opens that file at a pixel size and hands out
//! [`LoadedFace`]s, sharing the file bytes between every face opened from
//! the same path.
//!
//! Paths may carry a face index for collections: `fonts.ttc#1`.

pub mod loader;
pub mod query;
pub mod resolver;

pub use loader::{split_face_index, FileFaceLoader, LoadedFace, DEFAULT_MAX_FILES, MAX_FONT_SIZE};
pub use query::{FamilySpec, FontQuery, GenericFamily, Slant};
pub use resolver::SystemFontResolver;
