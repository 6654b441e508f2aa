//! Resource configuration

use std::path::PathBuf;

/// Resource manager configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceConfig {
    /// Directory asset paths are resolved against
    pub asset_root: PathBuf,
    /// Seconds per frame for animated tiles without `AnimationsPerSecond`
    pub default_frame_duration: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            default_frame_duration: 1.0,
        }
    }
}

impl ResourceConfig {
    /// Set the asset directory
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Set the fallback frame duration for animated tiles
    pub fn with_default_frame_duration(mut self, seconds: f32) -> Self {
        self.default_frame_duration = seconds;
        self
    }
}
