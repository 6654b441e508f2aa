//! UI skins
//!
//! A skin names the atlas regions and colors menu widgets draw with. The
//! definition is a RON file resolved against an already loaded atlas:
//!
//! ```ron
//! (
//!     drawables: { "button": "menu_button", "cursor": "menu_arrow" },
//!     colors: { "highlight": (1.0, 0.8, 0.0, 1.0) },
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetError, AtlasRegion, TextureAtlas};

/// On-disk skin description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkinDefinition {
    /// Drawable name to atlas region name
    #[serde(default)]
    pub drawables: BTreeMap<String, String>,
    /// Color name to RGBA
    #[serde(default)]
    pub colors: BTreeMap<String, (f32, f32, f32, f32)>,
}

impl SkinDefinition {
    /// Parse a definition from RON text
    ///
    /// # Errors
    ///
    /// Returns the RON error if the text is not a valid definition
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// An atlas region bound to the page it lives on
#[derive(Debug)]
pub struct SkinDrawable<P> {
    pub region: AtlasRegion,
    pub page: Rc<P>,
}

/// A skin resolved against its backing atlas
#[derive(Debug)]
pub struct Skin<P> {
    drawables: FxHashMap<String, SkinDrawable<P>>,
    colors: FxHashMap<String, [f32; 4]>,
}

impl<P> Skin<P> {
    /// Bind every drawable in `definition` to its region in `atlas`
    ///
    /// # Errors
    ///
    /// Returns a malformed-asset error naming the first drawable whose region
    /// the atlas does not contain
    pub fn resolve(
        definition: SkinDefinition,
        atlas: &TextureAtlas<P>,
        path: &Path,
    ) -> Result<Self, AssetError> {
        let mut drawables = FxHashMap::default();
        for (name, region_name) in definition.drawables {
            let region = atlas.find_region(&region_name).ok_or_else(|| {
                AssetError::malformed(
                    path,
                    format!("drawable '{name}' references missing region '{region_name}'"),
                )
            })?;
            let page = atlas.page_of(region).ok_or_else(|| {
                AssetError::malformed(
                    path,
                    format!("region '{region_name}' is on missing page {}", region.page),
                )
            })?;

            drawables.insert(
                name,
                SkinDrawable {
                    region: region.clone(),
                    page: Rc::clone(page),
                },
            );
        }

        let colors = definition
            .colors
            .into_iter()
            .map(|(name, (r, g, b, a))| (name, [r, g, b, a]))
            .collect();

        Ok(Self { drawables, colors })
    }

    /// Look up a drawable by name
    #[must_use]
    pub fn drawable(&self, name: &str) -> Option<&SkinDrawable<P>> {
        self.drawables.get(name)
    }

    /// Look up a color by name
    #[must_use]
    pub fn color(&self, name: &str) -> Option<[f32; 4]> {
        self.colors.get(name).copied()
    }

    /// Number of drawables
    #[must_use]
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    fn atlas() -> TextureAtlas<&'static str> {
        let region = AtlasRegion {
            name: "menu_arrow".to_string(),
            index: None,
            page: 0,
            position: UVec2::ZERO,
            size: UVec2::splat(16),
        };
        TextureAtlas::new(vec!["menu.png"], vec![region])
    }

    #[test]
    fn test_resolve_definition() {
        let definition = SkinDefinition::from_ron(
            r#"(
                drawables: { "cursor": "menu_arrow" },
                colors: { "highlight": (1.0, 0.5, 0.0, 1.0) },
            )"#,
        )
        .unwrap();

        let skin = Skin::resolve(definition, &atlas(), Path::new("menu.skin.ron")).unwrap();
        assert_eq!(skin.drawable_count(), 1);
        assert_eq!(*skin.drawable("cursor").unwrap().page, "menu.png");
        assert_eq!(skin.color("highlight"), Some([1.0, 0.5, 0.0, 1.0]));
        assert!(skin.color("shadow").is_none());
    }

    #[test]
    fn test_missing_region_is_malformed() {
        let mut definition = SkinDefinition::default();
        definition
            .drawables
            .insert("button".to_string(), "menu_button".to_string());

        let err = Skin::resolve(definition, &atlas(), Path::new("menu.skin.ron")).unwrap_err();
        assert!(matches!(err, AssetError::Malformed { .. }));
        assert!(err.to_string().contains("menu_button"));
    }
}
