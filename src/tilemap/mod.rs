//! Tiled maps
//!
//! Map structure, the Tiled JSON parser, and the animated tile derivation
//! run once on every freshly loaded map.

pub mod animation;
pub mod document;
mod map;

pub use animation::{DeriveSummary, TileAnimationError, derive_animated_tiles};
pub use map::{
    AnimatedTile, Cell, MapLayer, MapTile, Properties, Property, StaticTile, TileLayer, TileMap,
    TileSet,
};
