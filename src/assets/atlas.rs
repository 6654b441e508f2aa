//! Texture atlases
//!
//! An atlas is one or more texture pages plus named rectangular regions on
//! those pages. The on-disk description is a RON file:
//!
//! ```ron
//! (
//!     pages: [
//!         (
//!             image: "menu.png",
//!             regions: [
//!                 (name: "menu_megaman", x: 0, y: 0, width: 128, height: 32),
//!                 (name: "menu_arrow", index: Some(0), x: 0, y: 32, width: 16, height: 16),
//!             ],
//!         ),
//!     ],
//! )
//! ```

use std::rc::Rc;

use glam::UVec2;
use serde::{Deserialize, Serialize};

/// A named rectangle on one atlas page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasRegion {
    /// Region name as authored in the packer
    pub name: String,
    /// Frame index for regions sharing a name, `None` if unindexed
    pub index: Option<i32>,
    /// Index of the page the region lives on
    pub page: usize,
    /// Top-left corner in pixels
    pub position: UVec2,
    /// Size in pixels
    pub size: UVec2,
}

impl AtlasRegion {
    /// Bottom-right corner (exclusive) in pixels
    #[must_use]
    pub fn end(&self) -> UVec2 {
        self.position + self.size
    }
}

/// A decoded atlas: shared texture pages and the regions cut from them.
///
/// Pages are reference counted so sprites and skins derived from the atlas
/// can keep drawing from them; the native page is released when the last
/// holder drops it.
#[derive(Debug)]
pub struct TextureAtlas<P> {
    pages: Vec<Rc<P>>,
    regions: Vec<AtlasRegion>,
}

impl<P> TextureAtlas<P> {
    /// Build an atlas from decoded pages and their regions
    #[must_use]
    pub fn new(pages: Vec<P>, regions: Vec<AtlasRegion>) -> Self {
        Self {
            pages: pages.into_iter().map(Rc::new).collect(),
            regions,
        }
    }

    /// All regions in authoring order
    #[must_use]
    pub fn regions(&self) -> &[AtlasRegion] {
        &self.regions
    }

    /// All pages
    #[must_use]
    pub fn pages(&self) -> &[Rc<P>] {
        &self.pages
    }

    /// Page holding the given region
    #[must_use]
    pub fn page_of(&self, region: &AtlasRegion) -> Option<&Rc<P>> {
        self.pages.get(region.page)
    }

    /// First region with the given name
    #[must_use]
    pub fn find_region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Every region with the given name, ordered by frame index
    #[must_use]
    pub fn find_regions(&self, name: &str) -> Vec<&AtlasRegion> {
        let mut found: Vec<_> = self
            .regions
            .iter()
            .filter(|region| region.name == name)
            .collect();
        found.sort_by_key(|region| region.index.unwrap_or(-1));
        found
    }
}

/// On-disk description of an atlas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    /// Texture pages in page-index order
    pub pages: Vec<PageDescriptor>,
}

/// One texture page and the regions packed onto it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Image file, relative to the atlas file
    pub image: String,
    /// Regions on this page
    #[serde(default)]
    pub regions: Vec<RegionDescriptor>,
}

/// One packed region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub name: String,
    #[serde(default)]
    pub index: Option<i32>,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasDescriptor {
    /// Parse a descriptor from RON text
    ///
    /// # Errors
    ///
    /// Returns the RON error if the text is not a valid descriptor
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Flatten every page's regions, tagging each with its page index
    #[must_use]
    pub fn regions(&self) -> Vec<AtlasRegion> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(page, descriptor)| {
                descriptor.regions.iter().map(move |region| AtlasRegion {
                    name: region.name.clone(),
                    index: region.index,
                    page,
                    position: UVec2::new(region.x, region.y),
                    size: UVec2::new(region.width, region.height),
                })
            })
            .collect()
    }
}
