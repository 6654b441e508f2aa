//! Resource lifecycle management
//!
//! [`ResourceManager`] loads, shares and releases every asset the game
//! states use. Each asset carries an access counter: every `load_*` call
//! increments it and every `dispose_*` call decrements it. The asset is
//! released when the counter reaches zero, so two game states sharing a
//! texture atlas can each dispose their resources without invalidating the
//! other's.
//!
//! Some categories depend on others:
//! - loading a skin loads (and counts) its backing atlas; releasing the skin
//!   disposes that atlas once
//! - sprites are cut from atlas regions; releasing an atlas tears down every
//!   sprite cut from it
//!
//! # Example
//!
//! ```ignore
//! let mut resources = ResourceManager::new(FileSource::new("assets"), ResourceConfig::default());
//!
//! resources.load_skin(SkinKind::MainMenu)?;
//! resources.load_animated_sprite(TextureKind::MenuMegaman);
//! resources.load_sound(SoundKind::MenuMove)?;
//!
//! // ...
//!
//! // also disposes the menu atlas and the sprites cut from it
//! resources.dispose_skin(SkinKind::MainMenu);
//! resources.dispose_sound(SoundKind::MenuMove);
//! ```

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::atlas::{AtlasRegion, TextureAtlas};
use super::catalog::{AssetCategory, MusicKind, SkinKind, SoundKind, TextureKind};
use super::source::{AssetError, AssetSource};
use super::storage::{Registry, Release};
use crate::core::ResourceConfig;
use crate::graphics::{AnimatedSprite, Skin};
use crate::tilemap::{TileMap, derive_animated_tiles};

/// Texture kinds found in one atlas, bound to their regions
pub type RegionTable = FxHashMap<TextureKind, AtlasRegion>;

/// What [`ResourceManager::dispose_all`] released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Assets released
    pub released: usize,
    /// Assets whose remaining count showed unbalanced load/dispose calls
    pub mismatched: usize,
}

/// Loads, shares and releases game assets with per-asset access counters
pub struct ResourceManager<S: AssetSource> {
    source: S,
    config: ResourceConfig,
    atlases: Registry<PathBuf, TextureAtlas<S::Page>>,
    /// Derived-region table per loaded atlas
    atlas_regions: FxHashMap<PathBuf, RegionTable>,
    skins: Registry<SkinKind, Skin<S::Page>>,
    sprites: Registry<TextureKind, AnimatedSprite<S::Page>>,
    sounds: Registry<SoundKind, S::Sound>,
    music: Registry<MusicKind, S::Music>,
    tilemaps: Registry<PathBuf, TileMap>,
    /// Set once `dispose_all` ran
    torn_down: bool,
}

impl<S: AssetSource> ResourceManager<S> {
    /// Create an empty manager decoding through `source`
    pub fn new(source: S, config: ResourceConfig) -> Self {
        Self {
            source,
            config,
            atlases: Registry::new(),
            atlas_regions: FxHashMap::default(),
            skins: Registry::new(),
            sprites: Registry::new(),
            sounds: Registry::new(),
            music: Registry::new(),
            tilemaps: Registry::new(),
            torn_down: false,
        }
    }

    /// The decoding source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Active configuration
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn check_alive(&self, category: AssetCategory, key: &dyn Debug) {
        if self.torn_down {
            log::warn!("Loading {category} {key:?} after all resources were disposed");
        }
    }

    // ------------------------------------------------------------------------
    // Texture atlases
    // ------------------------------------------------------------------------

    /// Load a texture atlas, or count another holder if already loaded.
    ///
    /// Building the atlas also builds its region table: every region whose
    /// name matches a [`TextureKind`] of this atlas becomes available to
    /// [`Self::load_animated_sprite`].
    ///
    /// # Errors
    ///
    /// Returns the decoding error; nothing is inserted in that case
    pub fn load_texture_atlas(&mut self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref();
        self.check_alive(AssetCategory::Atlas, &path);

        if let Some(count) = self.atlases.acquire(path) {
            log::debug!("Texture atlas {} already loaded, count {count}", path.display());
            return Ok(());
        }

        let atlas = self.source.decode_atlas(path).inspect_err(|e| {
            log::error!("Failed to load {} {}: {e}", AssetCategory::Atlas, path.display());
        })?;

        let regions = build_region_table(path, &atlas);
        log::info!(
            "Loaded texture atlas {} ({} regions, {} sprite textures)",
            path.display(),
            atlas.regions().len(),
            regions.len()
        );

        self.atlas_regions.insert(path.to_path_buf(), regions);
        self.atlases.insert(path.to_path_buf(), atlas);
        Ok(())
    }

    /// Get a loaded texture atlas
    pub fn get_texture_atlas(&self, path: impl AsRef<Path>) -> Option<&TextureAtlas<S::Page>> {
        lookup(&self.atlases, path.as_ref(), AssetCategory::Atlas)
    }

    /// Release one holder of a texture atlas.
    ///
    /// When the last holder lets go, every sprite cut from the atlas is torn
    /// down, the atlas pages are released and its region table is cleared.
    pub fn dispose_texture_atlas(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Some(atlas) = release(&mut self.atlases, path, AssetCategory::Atlas) else {
            return;
        };

        let regions = self.atlas_regions.remove(path).unwrap_or_default();
        for kind in regions.keys() {
            if let Some((sprite, count)) = self.sprites.remove(kind) {
                if count > 1 {
                    log::warn!(
                        "Sprite {kind:?} still had {count} holders when its atlas {} was disposed",
                        path.display()
                    );
                }
                drop(sprite);
                log::debug!("Disposed sprite {kind:?} with its atlas");
            }
        }

        drop(atlas);
        log::info!("Disposed texture atlas {}", path.display());
    }

    /// Region table built for a loaded atlas
    pub fn regions_of(&self, path: impl AsRef<Path>) -> Option<&RegionTable> {
        self.atlas_regions.get(path.as_ref())
    }

    // ------------------------------------------------------------------------
    // Skins
    // ------------------------------------------------------------------------

    /// Load a skin and its backing atlas, or count another holder.
    ///
    /// The atlas is loaded (or counted) only when the skin itself is first
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns the decoding error of the atlas or the skin definition. A
    /// failed definition releases the atlas again.
    pub fn load_skin(&mut self, kind: SkinKind) -> Result<(), AssetError> {
        self.check_alive(AssetCategory::Skin, &kind);

        if let Some(count) = self.skins.acquire(&kind) {
            log::debug!("Skin {kind:?} already loaded, count {count}");
            return Ok(());
        }

        let atlas_path = Path::new(kind.atlas_path());
        self.load_texture_atlas(atlas_path)?;

        let skin_path = Path::new(kind.file_path());
        let decoded = match self.atlases.get(atlas_path) {
            Some(atlas) => self.source.decode_skin_definition(skin_path, atlas),
            None => Err(AssetError::malformed(
                atlas_path,
                "atlas missing right after loading it",
            )),
        };

        match decoded {
            Ok(skin) => {
                self.skins.insert(kind, skin);
                log::info!("Loaded skin {kind:?}");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {} {kind:?}: {e}", AssetCategory::Skin);
                self.dispose_texture_atlas(atlas_path);
                Err(e)
            }
        }
    }

    /// Get a loaded skin
    pub fn get_skin(&self, kind: SkinKind) -> Option<&Skin<S::Page>> {
        lookup(&self.skins, &kind, AssetCategory::Skin)
    }

    /// Release one holder of a skin; the last release also disposes its atlas once
    pub fn dispose_skin(&mut self, kind: SkinKind) {
        let Some(skin) = release(&mut self.skins, &kind, AssetCategory::Skin) else {
            return;
        };

        drop(skin);
        log::info!("Disposed skin {kind:?}");
        self.dispose_texture_atlas(kind.atlas_path());
    }

    // ------------------------------------------------------------------------
    // Animated sprites
    // ------------------------------------------------------------------------

    /// Cut an animated sprite from its loaded atlas, or count another holder.
    ///
    /// The atlas must already be loaded and contain the texture's region;
    /// otherwise nothing is created and a diagnostic is logged.
    pub fn load_animated_sprite(&mut self, kind: TextureKind) {
        self.check_alive(AssetCategory::Sprite, &kind);

        if let Some(count) = self.sprites.acquire(&kind) {
            log::debug!("Sprite {kind:?} already loaded, count {count}");
            return;
        }

        let atlas_path = Path::new(kind.atlas_path());
        let Some(atlas) = self.atlases.get(atlas_path) else {
            log::info!(
                "Cannot create sprite {kind:?}: texture atlas {} is not loaded",
                atlas_path.display()
            );
            return;
        };
        let Some(region) = self
            .atlas_regions
            .get(atlas_path)
            .and_then(|regions| regions.get(&kind))
        else {
            log::info!(
                "Texture atlas {} does not contain region {}",
                atlas_path.display(),
                kind.region_name()
            );
            return;
        };
        let Some(page) = atlas.page_of(region) else {
            log::warn!(
                "Region {} of {} points at missing page {}",
                region.name,
                atlas_path.display(),
                region.page
            );
            return;
        };

        let sprite = AnimatedSprite::new(kind, region.clone(), Rc::clone(page));
        log::info!("Loaded sprite {kind:?} ({} frames)", sprite.frame_count());
        self.sprites.insert(kind, sprite);
    }

    /// Get a loaded sprite
    pub fn get_animated_sprite(&self, kind: TextureKind) -> Option<&AnimatedSprite<S::Page>> {
        lookup(&self.sprites, &kind, AssetCategory::Sprite)
    }

    /// Release one holder of a sprite
    pub fn dispose_animated_sprite(&mut self, kind: TextureKind) {
        if let Some(sprite) = release(&mut self.sprites, &kind, AssetCategory::Sprite) {
            drop(sprite);
            log::info!("Disposed sprite {kind:?}");
        }
    }

    // ------------------------------------------------------------------------
    // Sounds and music
    // ------------------------------------------------------------------------

    /// Load a sound effect, or count another holder
    ///
    /// # Errors
    ///
    /// Returns the decoding error; nothing is inserted in that case
    pub fn load_sound(&mut self, kind: SoundKind) -> Result<(), AssetError> {
        self.check_alive(AssetCategory::Sound, &kind);
        let source = &mut self.source;
        acquire_or_load(&mut self.sounds, kind, AssetCategory::Sound, || {
            source.decode_audio_effect(Path::new(kind.file_path()))
        })
    }

    /// Get a loaded sound effect
    pub fn get_sound(&self, kind: SoundKind) -> Option<&S::Sound> {
        lookup(&self.sounds, &kind, AssetCategory::Sound)
    }

    /// Release one holder of a sound effect
    pub fn dispose_sound(&mut self, kind: SoundKind) {
        if let Some(sound) = release(&mut self.sounds, &kind, AssetCategory::Sound) {
            drop(sound);
            log::info!("Disposed sound {kind:?}");
        }
    }

    /// Open a music track, or count another holder
    ///
    /// # Errors
    ///
    /// Returns the decoding error; nothing is inserted in that case
    pub fn load_music(&mut self, kind: MusicKind) -> Result<(), AssetError> {
        self.check_alive(AssetCategory::Music, &kind);
        let source = &mut self.source;
        acquire_or_load(&mut self.music, kind, AssetCategory::Music, || {
            source.decode_audio_stream(Path::new(kind.file_path()))
        })
    }

    /// Get a loaded music track
    pub fn get_music(&self, kind: MusicKind) -> Option<&S::Music> {
        lookup(&self.music, &kind, AssetCategory::Music)
    }

    /// Release one holder of a music track
    pub fn dispose_music(&mut self, kind: MusicKind) {
        if let Some(music) = release(&mut self.music, &kind, AssetCategory::Music) {
            drop(music);
            log::info!("Disposed music {kind:?}");
        }
    }

    // ------------------------------------------------------------------------
    // Tilemaps
    // ------------------------------------------------------------------------

    /// Load a tilemap and derive its animated tiles, or count another holder
    ///
    /// # Errors
    ///
    /// Returns the decoding error, or a malformed-asset error when the map's
    /// animation metadata is inconsistent; nothing is inserted in that case
    pub fn load_tilemap(&mut self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref();
        self.check_alive(AssetCategory::Tilemap, &path);

        let default_frame_duration = self.config.default_frame_duration;
        let source = &mut self.source;
        acquire_or_load(
            &mut self.tilemaps,
            path.to_path_buf(),
            AssetCategory::Tilemap,
            || {
                let mut map = source.decode_document(path)?;
                let summary = derive_animated_tiles(&mut map, default_frame_duration)
                    .map_err(|e| AssetError::malformed(path, e.to_string()))?;
                log::debug!(
                    "Map {}: {} animation groups, {} animated cells, {} degraded",
                    path.display(),
                    summary.groups,
                    summary.animated_cells,
                    summary.degraded_cells
                );
                Ok(map)
            },
        )
    }

    /// Get a loaded tilemap
    pub fn get_tilemap(&self, path: impl AsRef<Path>) -> Option<&TileMap> {
        lookup(&self.tilemaps, path.as_ref(), AssetCategory::Tilemap)
    }

    /// Release one holder of a tilemap
    pub fn dispose_tilemap(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(map) = release(&mut self.tilemaps, path, AssetCategory::Tilemap) {
            drop(map);
            log::info!("Disposed tilemap {}", path.display());
        }
    }

    // ------------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------------

    /// Release every asset regardless of its count.
    ///
    /// Meant for process shutdown. Assets still held more than once indicate
    /// unbalanced load/dispose calls and are logged as warnings. Calling this
    /// again is a no-op.
    pub fn dispose_all(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();

        // sprites and skins share atlas pages, release them first
        drain_table(&mut self.sprites, AssetCategory::Sprite, &mut report);
        drain_table(&mut self.skins, AssetCategory::Skin, &mut report);
        drain_table(&mut self.atlases, AssetCategory::Atlas, &mut report);
        self.atlas_regions.clear();
        drain_table(&mut self.sounds, AssetCategory::Sound, &mut report);
        drain_table(&mut self.music, AssetCategory::Music, &mut report);
        drain_table(&mut self.tilemaps, AssetCategory::Tilemap, &mut report);

        if report.released > 0 {
            log::info!(
                "Released {} resources at shutdown ({} with unbalanced counts)",
                report.released,
                report.mismatched
            );
        }

        self.torn_down = true;
        report
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Loaded texture atlases
    pub fn atlases(&self) -> &Registry<PathBuf, TextureAtlas<S::Page>> {
        &self.atlases
    }

    /// Loaded skins
    pub fn skins(&self) -> &Registry<SkinKind, Skin<S::Page>> {
        &self.skins
    }

    /// Loaded sprites
    pub fn sprites(&self) -> &Registry<TextureKind, AnimatedSprite<S::Page>> {
        &self.sprites
    }

    /// Loaded sound effects
    pub fn sounds(&self) -> &Registry<SoundKind, S::Sound> {
        &self.sounds
    }

    /// Loaded music tracks
    pub fn music(&self) -> &Registry<MusicKind, S::Music> {
        &self.music
    }

    /// Loaded tilemaps
    pub fn tilemaps(&self) -> &Registry<PathBuf, TileMap> {
        &self.tilemaps
    }

    /// Total number of loaded assets across all categories
    pub fn loaded_count(&self) -> usize {
        self.atlases.len()
            + self.skins.len()
            + self.sprites.len()
            + self.sounds.len()
            + self.music.len()
            + self.tilemaps.len()
    }
}

impl<S: AssetSource> std::fmt::Debug for ResourceManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("atlases", &self.atlases.len())
            .field("skins", &self.skins.len())
            .field("sprites", &self.sprites.len())
            .field("sounds", &self.sounds.len())
            .field("music", &self.music.len())
            .field("tilemaps", &self.tilemaps.len())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

/// Bind every region of `atlas` that names one of its texture kinds.
///
/// When several regions share a name the last one listed is bound.
fn build_region_table<P>(path: &Path, atlas: &TextureAtlas<P>) -> RegionTable {
    let mut table = RegionTable::default();
    for region in atlas.regions() {
        match TextureKind::from_region_name(&region.name) {
            Some(kind) if Path::new(kind.atlas_path()) == path => {
                if table.insert(kind, region.clone()).is_some() {
                    log::debug!("Region {} of {} is listed twice", region.name, path.display());
                }
            }
            Some(kind) => log::info!(
                "Region {} of {} belongs to {kind:?} of atlas {}, ignoring it",
                region.name,
                path.display(),
                kind.atlas_path()
            ),
            None => log::info!(
                "Undefined texture kind for region {} of {}",
                region.name,
                path.display()
            ),
        }
    }
    table
}

fn lookup<'a, K, Q, T>(table: &'a Registry<K, T>, key: &Q, category: AssetCategory) -> Option<&'a T>
where
    K: Eq + Hash + Debug + Borrow<Q>,
    Q: Hash + Eq + Debug + ?Sized,
{
    let found = table.get(key);
    if found.is_none() {
        log::info!("{category} {key:?} was not loaded yet");
    }
    found
}

fn acquire_or_load<K, T>(
    table: &mut Registry<K, T>,
    key: K,
    category: AssetCategory,
    load: impl FnOnce() -> Result<T, AssetError>,
) -> Result<(), AssetError>
where
    K: Eq + Hash + Debug,
{
    if let Some(count) = table.acquire(&key) {
        log::debug!("{category} {key:?} already loaded, count {count}");
        return Ok(());
    }

    let value = load().inspect_err(|e| log::error!("Failed to load {category} {key:?}: {e}"))?;
    log::info!("Loaded {category} {key:?}");
    table.insert(key, value);
    Ok(())
}

/// Drop one holder; returns the asset once the last holder is gone
fn release<K, Q, T>(table: &mut Registry<K, T>, key: &Q, category: AssetCategory) -> Option<T>
where
    K: Eq + Hash + Debug + Borrow<Q>,
    Q: Hash + Eq + Debug + ?Sized,
{
    match table.release(key) {
        Release::Missing => {
            log::debug!("{category} {key:?} is not loaded, nothing to dispose");
            None
        }
        Release::Retained(count) => {
            log::debug!("{category} {key:?} still has {count} holders");
            None
        }
        Release::Released(value) => Some(value),
    }
}

fn drain_table<K: Eq + Hash + Debug, T>(
    table: &mut Registry<K, T>,
    category: AssetCategory,
    report: &mut TeardownReport,
) {
    for (key, value, count) in table.drain() {
        if count == 1 {
            log::info!("Releasing {category} {key:?} at shutdown");
        } else {
            log::warn!("Undisposed {category} {key:?} at shutdown, remaining count was {count}");
            report.mismatched += 1;
        }
        drop(value);
        report.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::catalog::{CHARACTERS_ATLAS, MENU_ATLAS};
    use crate::graphics::SkinDefinition;
    use crate::tilemap::{Cell, MapLayer, MapTile, Properties, StaticTile, TileLayer, TileSet};
    use glam::UVec2;
    use std::cell::Cell as Counter;

    /// Decode and release counters for one native resource type
    #[derive(Debug, Default, Clone)]
    struct Tally {
        decoded: Rc<Counter<usize>>,
        released: Rc<Counter<usize>>,
    }

    impl Tally {
        fn decoded(&self) -> usize {
            self.decoded.get()
        }

        fn released(&self) -> usize {
            self.released.get()
        }

        fn create(&self) -> Native {
            self.decoded.set(self.decoded.get() + 1);
            Native {
                released: Rc::clone(&self.released),
            }
        }
    }

    /// Stand-in for a native handle, counts its release
    #[derive(Debug)]
    struct Native {
        released: Rc<Counter<usize>>,
    }

    impl Drop for Native {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[derive(Default)]
    struct TestSource {
        pages: Tally,
        sounds: Tally,
        music: Tally,
        maps: usize,
        failing: Vec<PathBuf>,
        bad_animation_rate: bool,
        /// Kinds whose region is left out of decoded atlases
        missing_regions: Vec<TextureKind>,
        /// Kinds whose region points past the last page
        misplaced_regions: Vec<TextureKind>,
    }

    impl TestSource {
        fn check(&self, path: &Path) -> Result<(), AssetError> {
            if self.failing.iter().any(|p| p == path) {
                return Err(AssetError::decode(path, "corrupt test asset"));
            }
            Ok(())
        }
    }

    fn region(name: &str, x: u32) -> AtlasRegion {
        AtlasRegion {
            name: name.to_string(),
            index: None,
            page: 0,
            position: UVec2::new(x, 0),
            size: UVec2::new(256, 128),
        }
    }

    impl AssetSource for TestSource {
        type Page = Native;
        type Sound = Native;
        type Music = Native;

        fn decode_atlas(&mut self, path: &Path) -> Result<TextureAtlas<Native>, AssetError> {
            self.check(path)?;
            let mut regions: Vec<_> = TextureKind::ALL
                .into_iter()
                .filter(|kind| Path::new(kind.atlas_path()) == path)
                .filter(|kind| !self.missing_regions.contains(kind))
                .enumerate()
                .map(|(i, kind)| {
                    let mut region = region(kind.region_name(), i as u32 * 256);
                    if self.misplaced_regions.contains(&kind) {
                        region.page = 1;
                    }
                    region
                })
                .collect();
            regions.push(region("background", 0));
            if path == Path::new(MENU_ATLAS) {
                // belongs to the characters atlas
                regions.push(region("megaman", 0));
                if !self.missing_regions.contains(&TextureKind::MenuArrow) {
                    // listed twice, the later entry is bound
                    regions.push(region("menu_arrow", 1024));
                }
            }
            Ok(TextureAtlas::new(vec![self.pages.create()], regions))
        }

        fn decode_document(&mut self, path: &Path) -> Result<TileMap, AssetError> {
            self.check(path)?;
            self.maps += 1;

            let rate = if self.bad_animation_rate { "fast" } else { "4" };
            let tiles: Vec<_> = [
                StaticTile::new(1, 0, UVec2::ZERO, UVec2::splat(16))
                    .with_property("AnimationWater", "2")
                    .with_property("AnimationsPerSecond", rate),
                StaticTile::new(2, 0, UVec2::new(16, 0), UVec2::splat(16))
                    .with_property("AnimationWater", "1"),
            ]
            .into_iter()
            .map(Rc::new)
            .collect();

            let mut layer = TileLayer::new("ground", 1, 1);
            layer.set_cell(0, 0, Some(Cell::new(MapTile::Static(Rc::clone(&tiles[0])))));

            Ok(TileMap {
                size: UVec2::ONE,
                tile_size: UVec2::splat(16),
                tilesets: vec![TileSet {
                    name: "water".to_string(),
                    first_gid: 1,
                    image: PathBuf::from("water.png"),
                    tiles,
                }],
                layers: vec![MapLayer::Tiles(layer)],
                properties: Properties::new(),
            })
        }

        fn decode_audio_effect(&mut self, path: &Path) -> Result<Native, AssetError> {
            self.check(path)?;
            Ok(self.sounds.create())
        }

        fn decode_audio_stream(&mut self, path: &Path) -> Result<Native, AssetError> {
            self.check(path)?;
            Ok(self.music.create())
        }

        fn decode_skin_definition(
            &mut self,
            path: &Path,
            atlas: &TextureAtlas<Native>,
        ) -> Result<Skin<Native>, AssetError> {
            self.check(path)?;
            let mut definition = SkinDefinition::default();
            definition
                .drawables
                .insert("cursor".to_string(), "menu_arrow".to_string());
            Skin::resolve(definition, atlas, path)
        }
    }

    fn manager() -> ResourceManager<TestSource> {
        ResourceManager::new(TestSource::default(), ResourceConfig::default())
    }

    fn failing(paths: &[&str]) -> ResourceManager<TestSource> {
        let source = TestSource {
            failing: paths.iter().map(PathBuf::from).collect(),
            ..TestSource::default()
        };
        ResourceManager::new(source, ResourceConfig::default())
    }

    #[test]
    fn test_balanced_load_and_dispose_releases_once() {
        let mut resources = manager();
        for _ in 0..3 {
            resources.load_texture_atlas(CHARACTERS_ATLAS).unwrap();
        }
        assert_eq!(resources.source().pages.decoded(), 1);
        assert_eq!(resources.atlases().ref_count(Path::new(CHARACTERS_ATLAS)), Some(3));

        resources.dispose_texture_atlas(CHARACTERS_ATLAS);
        resources.dispose_texture_atlas(CHARACTERS_ATLAS);
        assert!(resources.get_texture_atlas(CHARACTERS_ATLAS).is_some());
        assert_eq!(resources.source().pages.released(), 0);

        resources.dispose_texture_atlas(CHARACTERS_ATLAS);
        assert!(resources.get_texture_atlas(CHARACTERS_ATLAS).is_none());
        assert!(resources.regions_of(CHARACTERS_ATLAS).is_none());
        assert_eq!(resources.source().pages.released(), 1);
    }

    #[test]
    fn test_get_unloaded_is_none_without_mutation() {
        let resources = manager();

        assert!(resources.get_texture_atlas(MENU_ATLAS).is_none());
        assert!(resources.get_skin(SkinKind::MainMenu).is_none());
        assert!(resources.get_animated_sprite(TextureKind::Megaman).is_none());
        assert!(resources.get_sound(SoundKind::Jump).is_none());
        assert!(resources.get_music(MusicKind::Menu).is_none());
        assert!(resources.get_tilemap("maps/stage.tmj").is_none());
        assert_eq!(resources.loaded_count(), 0);
    }

    #[test]
    fn test_sound_three_loads_two_disposes() {
        let mut resources = manager();
        for _ in 0..3 {
            resources.load_sound(SoundKind::MenuMove).unwrap();
        }
        resources.dispose_sound(SoundKind::MenuMove);
        resources.dispose_sound(SoundKind::MenuMove);

        assert_eq!(resources.sounds().ref_count(&SoundKind::MenuMove), Some(1));
        assert!(resources.get_sound(SoundKind::MenuMove).is_some());

        resources.dispose_sound(SoundKind::MenuMove);
        assert!(!resources.sounds().contains(&SoundKind::MenuMove));
        assert_eq!(resources.source().sounds.decoded(), 1);
        assert_eq!(resources.source().sounds.released(), 1);
    }

    #[test]
    fn test_music_lifecycle() {
        let mut resources = manager();
        resources.load_music(MusicKind::Protoman).unwrap();
        resources.load_music(MusicKind::MenuQuit).unwrap();
        resources.dispose_music(MusicKind::Protoman);

        assert!(resources.get_music(MusicKind::Protoman).is_none());
        assert!(resources.get_music(MusicKind::MenuQuit).is_some());
        assert_eq!(resources.source().music.released(), 1);
    }

    #[test]
    fn test_dispose_unloaded_is_noop() {
        let mut resources = manager();
        resources.dispose_texture_atlas(MENU_ATLAS);
        resources.dispose_skin(SkinKind::MainMenu);
        resources.dispose_animated_sprite(TextureKind::MenuArrow);
        resources.dispose_sound(SoundKind::Hit);
        resources.dispose_music(MusicKind::Topman);
        resources.dispose_tilemap("maps/stage.tmj");
        assert_eq!(resources.loaded_count(), 0);
    }

    #[test]
    fn test_skin_dispose_decrements_atlas_once() {
        let mut resources = manager();
        resources.load_texture_atlas(MENU_ATLAS).unwrap();
        resources.load_texture_atlas(MENU_ATLAS).unwrap();
        resources.load_skin(SkinKind::MainMenu).unwrap();
        assert_eq!(resources.atlases().ref_count(Path::new(MENU_ATLAS)), Some(3));

        resources.dispose_skin(SkinKind::MainMenu);
        assert!(resources.get_skin(SkinKind::MainMenu).is_none());
        assert_eq!(resources.atlases().ref_count(Path::new(MENU_ATLAS)), Some(2));
        assert_eq!(resources.source().pages.released(), 0);
    }

    #[test]
    fn test_repeated_skin_loads_count_atlas_once() {
        let mut resources = manager();
        resources.load_skin(SkinKind::MainMenu).unwrap();
        resources.load_skin(SkinKind::MainMenu).unwrap();
        assert_eq!(resources.skins().ref_count(&SkinKind::MainMenu), Some(2));
        assert_eq!(resources.atlases().ref_count(Path::new(MENU_ATLAS)), Some(1));

        let skin = resources.get_skin(SkinKind::MainMenu).unwrap();
        assert!(skin.drawable("cursor").is_some());

        resources.dispose_skin(SkinKind::MainMenu);
        assert_eq!(resources.atlases().ref_count(Path::new(MENU_ATLAS)), Some(1));
        resources.dispose_skin(SkinKind::MainMenu);
        assert!(resources.atlases().is_empty());
        assert_eq!(resources.source().pages.released(), 1);
    }

    #[test]
    fn test_region_table_binds_own_texture_kinds() {
        let mut resources = manager();
        resources.load_texture_atlas(MENU_ATLAS).unwrap();

        let regions = resources.regions_of(MENU_ATLAS).unwrap();
        assert_eq!(regions.len(), 4);
        assert!(regions.contains_key(&TextureKind::MenuMissile));
        // "megaman" belongs to the characters atlas, "background" to nothing
        assert!(!regions.contains_key(&TextureKind::Megaman));
    }

    #[test]
    fn test_sprite_requires_loaded_atlas() {
        let mut resources = manager();
        resources.load_animated_sprite(TextureKind::MenuMegaman);
        assert!(resources.get_animated_sprite(TextureKind::MenuMegaman).is_none());
        assert!(resources.sprites().is_empty());

        // loading the wrong atlas does not help either
        resources.load_texture_atlas(CHARACTERS_ATLAS).unwrap();
        resources.load_animated_sprite(TextureKind::MenuMegaman);
        assert!(resources.sprites().is_empty());
    }

    #[test]
    fn test_sprite_requires_atlas_region() {
        let source = TestSource {
            missing_regions: vec![TextureKind::MenuArrow],
            ..TestSource::default()
        };
        let mut resources = ResourceManager::new(source, ResourceConfig::default());
        resources.load_texture_atlas(MENU_ATLAS).unwrap();
        let regions = resources.regions_of(MENU_ATLAS).unwrap();
        assert!(!regions.contains_key(&TextureKind::MenuArrow));

        resources.load_animated_sprite(TextureKind::MenuArrow);
        assert!(resources.sprites().is_empty());
        assert_eq!(resources.atlases().ref_count(Path::new(MENU_ATLAS)), Some(1));

        // other kinds of the same atlas still load
        resources.load_animated_sprite(TextureKind::MenuMissile);
        assert_eq!(resources.sprites().len(), 1);
    }

    #[test]
    fn test_sprite_on_missing_page_is_skipped() {
        let source = TestSource {
            misplaced_regions: vec![TextureKind::MenuProtoman],
            ..TestSource::default()
        };
        let mut resources = ResourceManager::new(source, ResourceConfig::default());
        resources.load_texture_atlas(MENU_ATLAS).unwrap();

        resources.load_animated_sprite(TextureKind::MenuProtoman);
        assert!(resources.get_animated_sprite(TextureKind::MenuProtoman).is_none());
        assert_eq!(resources.atlases().ref_count(Path::new(MENU_ATLAS)), Some(1));
    }

    #[test]
    fn test_last_region_with_a_name_is_bound() {
        let mut resources = manager();
        resources.load_texture_atlas(MENU_ATLAS).unwrap();

        let regions = resources.regions_of(MENU_ATLAS).unwrap();
        assert_eq!(regions[&TextureKind::MenuArrow].position, UVec2::new(1024, 0));
    }

    #[test]
    fn test_sprite_refcount() {
        let mut resources = manager();
        resources.load_texture_atlas(CHARACTERS_ATLAS).unwrap();
        resources.load_animated_sprite(TextureKind::Megaman);
        resources.load_animated_sprite(TextureKind::Megaman);

        let sprite = resources.get_animated_sprite(TextureKind::Megaman).unwrap();
        assert_eq!(sprite.frame_count(), 32);

        resources.dispose_animated_sprite(TextureKind::Megaman);
        assert_eq!(resources.sprites().ref_count(&TextureKind::Megaman), Some(1));
        resources.dispose_animated_sprite(TextureKind::Megaman);
        assert!(resources.sprites().is_empty());
        // the atlas is unaffected
        assert!(resources.get_texture_atlas(CHARACTERS_ATLAS).is_some());
    }

    #[test]
    fn test_atlas_dispose_cascades_to_sprites() {
        let mut resources = manager();
        resources.load_texture_atlas(MENU_ATLAS).unwrap();
        resources.load_animated_sprite(TextureKind::MenuMegaman);
        resources.load_animated_sprite(TextureKind::MenuArrow);
        resources.load_animated_sprite(TextureKind::MenuArrow);
        assert_eq!(resources.sprites().len(), 2);

        resources.dispose_texture_atlas(MENU_ATLAS);
        assert!(resources.sprites().is_empty());
        assert!(resources.regions_of(MENU_ATLAS).is_none());
        assert_eq!(resources.source().pages.released(), 1);
    }

    #[test]
    fn test_skin_dispose_cascades_through_atlas() {
        let mut resources = manager();
        resources.load_skin(SkinKind::MainMenu).unwrap();
        resources.load_animated_sprite(TextureKind::MenuProtoman);
        resources.load_animated_sprite(TextureKind::MenuMissile);

        resources.dispose_skin(SkinKind::MainMenu);
        assert_eq!(resources.loaded_count(), 0);
        assert_eq!(resources.source().pages.released(), 1);
    }

    #[test]
    fn test_failed_load_leaves_nothing() {
        let mut resources = failing(&[SoundKind::Hit.file_path(), "maps/broken.tmj"]);

        let err = resources.load_sound(SoundKind::Hit).unwrap_err();
        assert!(matches!(err, AssetError::DecodeError { .. }));
        assert!(!resources.sounds().contains(&SoundKind::Hit));

        assert!(resources.load_tilemap("maps/broken.tmj").is_err());
        assert!(resources.tilemaps().is_empty());
    }

    #[test]
    fn test_failed_skin_releases_its_atlas() {
        let mut resources = failing(&[SkinKind::MainMenu.file_path()]);

        assert!(resources.load_skin(SkinKind::MainMenu).is_err());
        assert!(resources.skins().is_empty());
        assert!(resources.atlases().is_empty());
        assert_eq!(resources.source().pages.decoded(), 1);
        assert_eq!(resources.source().pages.released(), 1);
    }

    #[test]
    fn test_failed_atlas_fails_skin() {
        let mut resources = failing(&[MENU_ATLAS]);
        assert!(resources.load_skin(SkinKind::MainMenu).is_err());
        assert_eq!(resources.loaded_count(), 0);
    }

    #[test]
    fn test_tilemap_load_derives_animations() {
        let mut resources = manager();
        resources.load_tilemap("maps/stage.tmj").unwrap();
        resources.load_tilemap("maps/stage.tmj").unwrap();
        assert_eq!(resources.source().maps, 1);

        let map = resources.get_tilemap("maps/stage.tmj").unwrap();
        let layer = map.tile_layers().next().unwrap();
        let animated = layer.cell(0, 0).unwrap().tile.as_animated().unwrap();
        let ids: Vec<_> = animated.frames().iter().map(|tile| tile.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(animated.frame_duration(), 0.25);

        resources.dispose_tilemap("maps/stage.tmj");
        assert!(resources.get_tilemap("maps/stage.tmj").is_some());
        resources.dispose_tilemap("maps/stage.tmj");
        assert!(resources.tilemaps().is_empty());
    }

    #[test]
    fn test_malformed_animation_fails_load() {
        let source = TestSource {
            bad_animation_rate: true,
            ..TestSource::default()
        };
        let mut resources = ResourceManager::new(source, ResourceConfig::default());

        let err = resources.load_tilemap("maps/stage.tmj").unwrap_err();
        assert!(matches!(err, AssetError::Malformed { .. }));
        assert_eq!(err.path(), Path::new("maps/stage.tmj"));
        assert!(resources.tilemaps().is_empty());
    }

    #[test]
    fn test_dispose_all_releases_everything() {
        let mut resources = manager();
        resources.load_skin(SkinKind::MainMenu).unwrap();
        resources.load_animated_sprite(TextureKind::MenuArrow);
        resources.load_texture_atlas(CHARACTERS_ATLAS).unwrap();
        resources.load_texture_atlas(CHARACTERS_ATLAS).unwrap();
        resources.load_sound(SoundKind::Shoot).unwrap();
        resources.load_music(MusicKind::WilyStage).unwrap();
        resources.load_tilemap("maps/stage.tmj").unwrap();

        let report = resources.dispose_all();
        assert_eq!(report.released, 7);
        assert_eq!(report.mismatched, 1);
        assert_eq!(resources.loaded_count(), 0);
        assert!(resources.regions_of(MENU_ATLAS).is_none());
        assert_eq!(resources.source().pages.released(), 2);
        assert_eq!(resources.source().sounds.released(), 1);
        assert_eq!(resources.source().music.released(), 1);

        let again = resources.dispose_all();
        assert_eq!(again, TeardownReport::default());
        assert_eq!(resources.source().pages.released(), 2);
    }
}
