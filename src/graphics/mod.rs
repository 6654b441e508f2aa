//! Graphics resources derived from texture atlases

mod skin;
mod sprite;

pub use skin::{Skin, SkinDefinition, SkinDrawable};
pub use sprite::AnimatedSprite;
