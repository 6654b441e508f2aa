//! Asset decoding
//!
//! [`AssetSource`] is the seam between the resource manager and storage.
//! [`FileSource`] reads assets from a directory tree; tests substitute an
//! in-memory source.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::atlas::{AtlasDescriptor, TextureAtlas};
use crate::audio::{MusicStream, SoundEffect};
use crate::graphics::{Skin, SkinDefinition};
use crate::tilemap::TileMap;
use crate::tilemap::document::load_document;

/// Materializes raw assets from storage.
///
/// The associated types are the native values the manager owns; dropping one
/// releases it.
pub trait AssetSource {
    /// A decoded atlas texture page
    type Page;
    /// A decoded sound effect
    type Sound;
    /// A music track ready to stream
    type Music;

    /// Decode an atlas and its named regions
    fn decode_atlas(&mut self, path: &Path) -> Result<TextureAtlas<Self::Page>, AssetError>;

    /// Parse a tilemap document
    fn decode_document(&mut self, path: &Path) -> Result<TileMap, AssetError>;

    /// Decode a sound effect
    fn decode_audio_effect(&mut self, path: &Path) -> Result<Self::Sound, AssetError>;

    /// Open a music track for streaming
    fn decode_audio_stream(&mut self, path: &Path) -> Result<Self::Music, AssetError>;

    /// Decode a skin definition and bind it to its already loaded atlas
    fn decode_skin_definition(
        &mut self,
        path: &Path,
        atlas: &TextureAtlas<Self::Page>,
    ) -> Result<Skin<Self::Page>, AssetError>;
}

/// Reads assets from files below a root directory
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Create a source rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory asset paths are resolved against
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn read_text(path: &Path) -> Result<String, AssetError> {
        fs::read_to_string(path).map_err(|e| AssetError::io(path, &e))
    }
}

impl AssetSource for FileSource {
    type Page = RgbaImage;
    type Sound = SoundEffect;
    type Music = MusicStream;

    fn decode_atlas(&mut self, path: &Path) -> Result<TextureAtlas<RgbaImage>, AssetError> {
        let full = self.resolve(path);
        let descriptor = AtlasDescriptor::from_ron(&Self::read_text(&full)?)
            .map_err(|e| AssetError::decode(&full, e))?;
        let base = full.parent().unwrap_or_else(|| Path::new(""));

        let mut pages = Vec::with_capacity(descriptor.pages.len());
        for page in &descriptor.pages {
            let image_path = base.join(&page.image);
            let image = image::open(&image_path)
                .map_err(|e| AssetError::decode(&image_path, e))?
                .to_rgba8();
            pages.push(image);
        }

        let regions = descriptor.regions();
        for region in &regions {
            let Some(page) = pages.get(region.page) else {
                return Err(AssetError::malformed(
                    &full,
                    format!("region '{}' is on missing page {}", region.name, region.page),
                ));
            };
            let end = region.end();
            if end.x > page.width() || end.y > page.height() {
                return Err(AssetError::malformed(
                    &full,
                    format!(
                        "region '{}' ends at {}x{} outside its {}x{} page",
                        region.name,
                        end.x,
                        end.y,
                        page.width(),
                        page.height()
                    ),
                ));
            }
        }

        Ok(TextureAtlas::new(pages, regions))
    }

    fn decode_document(&mut self, path: &Path) -> Result<TileMap, AssetError> {
        load_document(self.resolve(path))
    }

    fn decode_audio_effect(&mut self, path: &Path) -> Result<SoundEffect, AssetError> {
        SoundEffect::from_file(self.resolve(path))
    }

    fn decode_audio_stream(&mut self, path: &Path) -> Result<MusicStream, AssetError> {
        MusicStream::probe(self.resolve(path))
    }

    fn decode_skin_definition(
        &mut self,
        path: &Path,
        atlas: &TextureAtlas<RgbaImage>,
    ) -> Result<Skin<RgbaImage>, AssetError> {
        let full = self.resolve(path);
        let definition = SkinDefinition::from_ron(&Self::read_text(&full)?)
            .map_err(|e| AssetError::decode(&full, e))?;
        Skin::resolve(definition, atlas, &full)
    }
}

/// Errors that can occur while materializing an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// IO error reading the file
    IoError { path: PathBuf, message: String },
    /// The file is not in a format the decoder understands
    DecodeError { path: PathBuf, message: String },
    /// The file decoded but its content is inconsistent
    Malformed { path: PathBuf, message: String },
}

impl AssetError {
    pub fn io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub fn decode(path: impl Into<PathBuf>, error: impl fmt::Display) -> Self {
        Self::DecodeError {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// File the error refers to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::IoError { path, .. } | Self::DecodeError { path, .. } | Self::Malformed { path, .. } => {
                path
            }
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError { path, message } => {
                write!(f, "IO error reading {}: {message}", path.display())
            }
            Self::DecodeError { path, message } => {
                write!(f, "Decode error in {}: {message}", path.display())
            }
            Self::Malformed { path, message } => {
                write!(f, "Malformed asset {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {}
