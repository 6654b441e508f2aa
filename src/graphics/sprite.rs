//! Animated sprites cut from atlas regions

use std::rc::Rc;

use glam::UVec2;
use smallvec::SmallVec;

use crate::assets::AtlasRegion;
use crate::assets::catalog::TextureKind;

/// A sprite sheet region split into equally sized frames.
///
/// Holds a share of the atlas page it draws from. Its lifetime is driven by
/// the atlas: tearing down the atlas tears down every sprite cut from it.
#[derive(Debug)]
pub struct AnimatedSprite<P> {
    kind: TextureKind,
    page: Rc<P>,
    region: AtlasRegion,
    frame_size: UVec2,
    /// Top-left corner of each frame on the page, row-major
    frames: SmallVec<[UVec2; 8]>,
    /// Seconds each frame is shown
    frame_duration: f32,
}

impl<P> AnimatedSprite<P> {
    /// Split `region` into the frame grid declared by `kind`
    #[must_use]
    pub fn new(kind: TextureKind, region: AtlasRegion, page: Rc<P>) -> Self {
        let grid = kind.frame_grid().max(UVec2::ONE);
        let mut frame_size = region.size / grid;

        let frames: SmallVec<[UVec2; 8]> = if frame_size.x == 0 || frame_size.y == 0 {
            log::warn!(
                "Region {} ({}x{}) is smaller than its {}x{} frame grid, using it as a single frame",
                region.name,
                region.size.x,
                region.size.y,
                grid.x,
                grid.y
            );
            frame_size = region.size;
            smallvec::smallvec![region.position]
        } else {
            (0..grid.y)
                .flat_map(|row| (0..grid.x).map(move |column| UVec2::new(column, row)))
                .map(|cell| region.position + cell * frame_size)
                .collect()
        };

        Self {
            kind,
            page,
            region,
            frame_size,
            frames,
            frame_duration: 1.0 / kind.frames_per_second(),
        }
    }

    /// Texture this sprite was created for
    #[must_use]
    pub const fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Atlas page the frames live on
    #[must_use]
    pub fn page(&self) -> &Rc<P> {
        &self.page
    }

    /// Source region in the atlas
    #[must_use]
    pub const fn region(&self) -> &AtlasRegion {
        &self.region
    }

    /// Size of one frame in pixels
    #[must_use]
    pub const fn frame_size(&self) -> UVec2 {
        self.frame_size
    }

    /// Number of frames
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Seconds each frame is shown
    #[must_use]
    pub const fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    /// Frame shown `elapsed` seconds into a looping playback
    #[must_use]
    pub fn frame_index_at(&self, elapsed: f32) -> usize {
        let step = (elapsed.max(0.0) / self.frame_duration) as usize;
        step % self.frames.len()
    }

    /// Top-left corner of the frame shown `elapsed` seconds into playback
    #[must_use]
    pub fn frame_at(&self, elapsed: f32) -> UVec2 {
        self.frames[self.frame_index_at(elapsed)]
    }
}
