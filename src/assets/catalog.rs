//! Closed asset catalogs
//!
//! Every skin, sprite texture, sound and music track the game ships with is
//! named here together with the file it lives in. Atlases and tilemaps are
//! keyed by path instead.

use std::fmt;

use glam::UVec2;

/// Asset category, used to label diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    /// Texture atlas
    Atlas,
    /// UI skin
    Skin,
    /// Animated sprite derived from an atlas region
    Sprite,
    /// Short sound effect
    Sound,
    /// Streamed music track
    Music,
    /// Tiled map
    Tilemap,
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Atlas => "texture atlas",
            Self::Skin => "skin",
            Self::Sprite => "sprite",
            Self::Sound => "sound",
            Self::Music => "music",
            Self::Tilemap => "tilemap",
        };
        f.write_str(name)
    }
}

/// Atlas holding the menu graphics and the main menu skin drawables
pub const MENU_ATLAS: &str = "graphics/menu/menu.atlas";
/// Atlas holding the in-game character sprites
pub const CHARACTERS_ATLAS: &str = "graphics/characters/characters.atlas";

/// Sprite textures, each bound to one region of one atlas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKind {
    MenuMegaman,
    MenuProtoman,
    MenuMissile,
    MenuArrow,
    Megaman,
    Protoman,
    MegamanShot,
    ProtomanShot,
}

impl TextureKind {
    /// Every texture kind
    pub const ALL: [Self; 8] = [
        Self::MenuMegaman,
        Self::MenuProtoman,
        Self::MenuMissile,
        Self::MenuArrow,
        Self::Megaman,
        Self::Protoman,
        Self::MegamanShot,
        Self::ProtomanShot,
    ];

    /// Path of the atlas that supplies this texture
    #[must_use]
    pub const fn atlas_path(self) -> &'static str {
        match self {
            Self::MenuMegaman | Self::MenuProtoman | Self::MenuMissile | Self::MenuArrow => {
                MENU_ATLAS
            }
            Self::Megaman | Self::Protoman | Self::MegamanShot | Self::ProtomanShot => {
                CHARACTERS_ATLAS
            }
        }
    }

    /// Name of the atlas region holding this texture
    #[must_use]
    pub const fn region_name(self) -> &'static str {
        match self {
            Self::MenuMegaman => "menu_megaman",
            Self::MenuProtoman => "menu_protoman",
            Self::MenuMissile => "menu_missile",
            Self::MenuArrow => "menu_arrow",
            Self::Megaman => "megaman",
            Self::Protoman => "protoman",
            Self::MegamanShot => "megaman_shot",
            Self::ProtomanShot => "protoman_shot",
        }
    }

    /// Frame layout of the region as columns by rows
    #[must_use]
    pub const fn frame_grid(self) -> UVec2 {
        match self {
            Self::MenuMegaman | Self::MenuProtoman => UVec2::new(4, 1),
            Self::MenuMissile => UVec2::new(2, 1),
            Self::MenuArrow => UVec2::new(1, 1),
            Self::Megaman | Self::Protoman => UVec2::new(8, 4),
            Self::MegamanShot | Self::ProtomanShot => UVec2::new(3, 1),
        }
    }

    /// Playback rate of the sprite animation in frames per second
    #[must_use]
    pub const fn frames_per_second(self) -> f32 {
        match self {
            Self::MenuArrow => 1.0,
            Self::MenuMegaman | Self::MenuProtoman | Self::MenuMissile => 6.0,
            Self::Megaman | Self::Protoman => 10.0,
            Self::MegamanShot | Self::ProtomanShot => 12.0,
        }
    }

    /// Find the texture kind bound to an atlas region name
    #[must_use]
    pub fn from_region_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.region_name() == name)
    }
}

/// UI skins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkinKind {
    MainMenu,
}

impl SkinKind {
    /// Every skin kind
    pub const ALL: [Self; 1] = [Self::MainMenu];

    /// Path of the skin definition file
    #[must_use]
    pub const fn file_path(self) -> &'static str {
        match self {
            Self::MainMenu => "graphics/menu/menu.skin.ron",
        }
    }

    /// Path of the atlas the skin draws from
    #[must_use]
    pub const fn atlas_path(self) -> &'static str {
        match self {
            Self::MainMenu => MENU_ATLAS,
        }
    }
}

/// Sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundKind {
    MenuMove,
    MenuSelect,
    MenuSelectShoot,
    Shoot,
    Hit,
    Jump,
}

impl SoundKind {
    /// Every sound kind
    pub const ALL: [Self; 6] = [
        Self::MenuMove,
        Self::MenuSelect,
        Self::MenuSelectShoot,
        Self::Shoot,
        Self::Hit,
        Self::Jump,
    ];

    /// Path of the sound file
    #[must_use]
    pub const fn file_path(self) -> &'static str {
        match self {
            Self::MenuMove => "audio/sounds/menu_move.wav",
            Self::MenuSelect => "audio/sounds/menu_select.wav",
            Self::MenuSelectShoot => "audio/sounds/menu_select_shoot.wav",
            Self::Shoot => "audio/sounds/shoot.wav",
            Self::Hit => "audio/sounds/hit.wav",
            Self::Jump => "audio/sounds/jump.wav",
        }
    }
}

/// Music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MusicKind {
    Menu,
    MenuQuit,
    Sparkman,
    Shadowman,
    Snakeman,
    Needleman,
    Hardman,
    Topman,
    Geminiman,
    Magnetman,
    Protoman,
    WilyStage,
}

impl MusicKind {
    /// Every music kind
    pub const ALL: [Self; 12] = [
        Self::Menu,
        Self::MenuQuit,
        Self::Sparkman,
        Self::Shadowman,
        Self::Snakeman,
        Self::Needleman,
        Self::Hardman,
        Self::Topman,
        Self::Geminiman,
        Self::Magnetman,
        Self::Protoman,
        Self::WilyStage,
    ];

    /// Path of the music file
    #[must_use]
    pub const fn file_path(self) -> &'static str {
        match self {
            Self::Menu => "audio/music/menu.mp3",
            Self::MenuQuit => "audio/sounds/menu_quit.wav",
            Self::Sparkman => "audio/music/sparkman.mp3",
            Self::Shadowman => "audio/music/shadowman.mp3",
            Self::Snakeman => "audio/music/snakeman.mp3",
            Self::Needleman => "audio/music/needleman.mp3",
            Self::Hardman => "audio/music/hardman.mp3",
            Self::Topman => "audio/music/topman.mp3",
            Self::Geminiman => "audio/music/geminiman.mp3",
            Self::Magnetman => "audio/music/magnetman.mp3",
            Self::Protoman => "audio/music/protoman_theme.mp3",
            Self::WilyStage => "audio/music/wily_stage_1.mp3",
        }
    }

    /// Title shown by the audio settings page, `None` for jingles
    #[must_use]
    pub const fn display_name(self) -> Option<&'static str> {
        match self {
            Self::Menu => Some("mm3 title theme"),
            Self::MenuQuit => None,
            Self::Sparkman => Some("sparkman theme"),
            Self::Shadowman => Some("shadowman theme"),
            Self::Snakeman => Some("snakeman theme"),
            Self::Needleman => Some("needleman theme"),
            Self::Hardman => Some("hardman theme"),
            Self::Topman => Some("topman theme"),
            Self::Geminiman => Some("geminiman theme"),
            Self::Magnetman => Some("magnetman theme"),
            Self::Protoman => Some("protoman theme"),
            Self::WilyStage => Some("mm3 wily stage 1"),
        }
    }
}
