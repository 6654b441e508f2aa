//! Resource management for a 2D platformer
//!
//! This crate provides:
//! - Counted loading and release of texture atlases, skins, sprites,
//!   sound effects, music tracks and Tiled maps
//! - Cascading release of the assets derived from an atlas
//! - Animated tiles derived from Tiled tile properties
//! - A game session owning the resources and the active game states

pub mod assets;
pub mod audio;
pub mod core;
pub mod graphics;
pub mod tilemap;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::catalog::{MusicKind, SkinKind, SoundKind, TextureKind};
    pub use crate::assets::{AssetError, AssetSource, FileSource, ResourceManager, TeardownReport};
    pub use crate::audio::{MusicStream, SoundEffect};
    pub use crate::core::{GameState, ResourceConfig, Session};
    pub use crate::graphics::{AnimatedSprite, Skin};
    pub use crate::tilemap::{AnimatedTile, MapTile, TileMap};
    pub use glam::UVec2;
}
