//! Asset and resource management
//!
//! Provides counted resource management with:
//! - A registry table per asset category
//! - Access counting so shared assets outlive each holder but the last
//! - Cascading release of skins, atlases and the sprites cut from them
//! - A decoding seam ([`AssetSource`]) between the manager and storage

mod atlas;
pub mod catalog;
mod handle;
mod manager;
mod source;
mod storage;

pub use atlas::{AtlasDescriptor, AtlasRegion, PageDescriptor, RegionDescriptor, TextureAtlas};
pub use handle::ResourceHandle;
pub use manager::{RegionTable, ResourceManager, TeardownReport};
pub use source::{AssetError, AssetSource, FileSource};
pub use storage::{Registry, Release};
