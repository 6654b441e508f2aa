//! Demo walking through the menu and game over states

use std::process::ExitCode;

use protoman_resources::prelude::*;

const MENU_SOUNDS: [SoundKind; 2] = [SoundKind::MenuMove, SoundKind::MenuSelect];
const GAME_OVER_SPRITES: [TextureKind; 3] = [
    TextureKind::MenuMegaman,
    TextureKind::MenuProtoman,
    TextureKind::MenuMissile,
];
const GAME_OVER_MUSIC: [MusicKind; 2] = [MusicKind::MenuQuit, MusicKind::Protoman];
const GAME_OVER_SOUNDS: [SoundKind; 3] = [
    SoundKind::MenuMove,
    SoundKind::MenuSelect,
    SoundKind::MenuSelectShoot,
];

type Resources = ResourceManager<FileSource>;

/// Load every key in order. If one fails, the keys loaded before it are
/// disposed again and the error is returned.
fn load_each<S: AssetSource, K: Copy>(
    resources: &mut ResourceManager<S>,
    keys: &[K],
    load: fn(&mut ResourceManager<S>, K) -> Result<(), AssetError>,
    dispose: fn(&mut ResourceManager<S>, K),
) -> Result<(), AssetError> {
    for (loaded, &key) in keys.iter().enumerate() {
        if let Err(e) = load(resources, key) {
            for &done in &keys[..loaded] {
                dispose(resources, done);
            }
            return Err(e);
        }
    }
    Ok(())
}

/// Main menu: skin, cursor sprite, title music
struct MainMenuState;

impl GameState<FileSource> for MainMenuState {
    fn name(&self) -> &str {
        "main menu"
    }

    fn load_resources(&mut self, resources: &mut Resources) -> Result<(), AssetError> {
        resources.load_skin(SkinKind::MainMenu)?;
        resources.load_animated_sprite(TextureKind::MenuArrow);

        if let Err(e) = resources.load_music(MusicKind::Menu) {
            resources.dispose_skin(SkinKind::MainMenu);
            return Err(e);
        }
        if let Err(e) = load_each(
            resources,
            &MENU_SOUNDS,
            Resources::load_sound,
            Resources::dispose_sound,
        ) {
            resources.dispose_music(MusicKind::Menu);
            resources.dispose_skin(SkinKind::MainMenu);
            return Err(e);
        }
        Ok(())
    }

    fn dispose_resources(&mut self, resources: &mut Resources) {
        // the skin releases the menu atlas and the arrow sprite with it
        resources.dispose_skin(SkinKind::MainMenu);
        resources.dispose_music(MusicKind::Menu);
        for sound in MENU_SOUNDS {
            resources.dispose_sound(sound);
        }
    }
}

/// Game over screen shown on top of the menu
struct GameOverState;

impl GameOverState {
    fn dispose_graphics(resources: &mut Resources) {
        for sprite in GAME_OVER_SPRITES {
            resources.dispose_animated_sprite(sprite);
        }
        resources.dispose_skin(SkinKind::MainMenu);
    }
}

impl GameState<FileSource> for GameOverState {
    fn name(&self) -> &str {
        "game over"
    }

    fn load_resources(&mut self, resources: &mut Resources) -> Result<(), AssetError> {
        resources.load_skin(SkinKind::MainMenu)?;
        for sprite in GAME_OVER_SPRITES {
            resources.load_animated_sprite(sprite);
        }

        if let Err(e) = load_each(
            resources,
            &GAME_OVER_MUSIC,
            Resources::load_music,
            Resources::dispose_music,
        ) {
            Self::dispose_graphics(resources);
            return Err(e);
        }
        if let Err(e) = load_each(
            resources,
            &GAME_OVER_SOUNDS,
            Resources::load_sound,
            Resources::dispose_sound,
        ) {
            for music in GAME_OVER_MUSIC {
                resources.dispose_music(music);
            }
            Self::dispose_graphics(resources);
            return Err(e);
        }
        Ok(())
    }

    fn dispose_resources(&mut self, resources: &mut Resources) {
        Self::dispose_graphics(resources);
        for music in GAME_OVER_MUSIC {
            resources.dispose_music(music);
        }
        for sound in GAME_OVER_SOUNDS {
            resources.dispose_sound(sound);
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut config = ResourceConfig::default();
    if let Some(root) = std::env::args().nth(1) {
        config = config.with_asset_root(root);
    }
    let map = std::env::args().nth(2);

    let source = FileSource::new(&config.asset_root);
    let mut session = Session::new(source, config);

    let states: [Box<dyn GameState<FileSource>>; 2] =
        [Box::new(MainMenuState), Box::new(GameOverState)];
    for state in states {
        if let Err(e) = session.push_state(state) {
            eprintln!("Failed to enter state: {e}");
            session.shutdown();
            return ExitCode::FAILURE;
        }
        log::info!(
            "{} active, {} resources loaded",
            session.current_state().unwrap_or("no state"),
            session.resources().loaded_count()
        );
    }

    if let Some(map) = map {
        match session.resources_mut().load_tilemap(&map) {
            Ok(()) => {
                if let Some(tilemap) = session.resources().get_tilemap(&map) {
                    let animated = tilemap
                        .tile_layers()
                        .flat_map(|layer| layer.cells())
                        .filter(|cell| cell.tile.as_animated().is_some())
                        .count();
                    log::info!("Map {map} has {animated} animated cells");
                }
                session.resources_mut().dispose_tilemap(&map);
            }
            Err(e) => eprintln!("Failed to load map: {e}"),
        }
    }

    session.pop_state();
    let report = session.shutdown();
    log::info!(
        "Shutdown released {} resources, {} unbalanced",
        report.released,
        report.mismatched
    );

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use protoman_resources::assets::TextureAtlas;
    use std::path::Path;

    /// Decodes sounds into unit values, failing for one of them
    struct FlakySource {
        broken: SoundKind,
    }

    impl AssetSource for FlakySource {
        type Page = ();
        type Sound = ();
        type Music = ();

        fn decode_atlas(&mut self, _path: &Path) -> Result<TextureAtlas<()>, AssetError> {
            Ok(TextureAtlas::new(vec![()], Vec::new()))
        }

        fn decode_document(&mut self, path: &Path) -> Result<TileMap, AssetError> {
            Err(AssetError::malformed(path, "no maps"))
        }

        fn decode_audio_effect(&mut self, path: &Path) -> Result<(), AssetError> {
            if path == Path::new(self.broken.file_path()) {
                return Err(AssetError::decode(path, "truncated"));
            }
            Ok(())
        }

        fn decode_audio_stream(&mut self, _path: &Path) -> Result<(), AssetError> {
            Ok(())
        }

        fn decode_skin_definition(
            &mut self,
            path: &Path,
            atlas: &TextureAtlas<()>,
        ) -> Result<Skin<()>, AssetError> {
            Skin::resolve(Default::default(), atlas, path)
        }
    }

    #[test]
    fn test_failed_sound_releases_earlier_sounds() {
        let source = FlakySource {
            broken: SoundKind::MenuSelectShoot,
        };
        let mut resources = ResourceManager::new(source, ResourceConfig::default());
        // held by another state
        resources.load_sound(SoundKind::MenuMove).unwrap();

        let result = load_each(
            &mut resources,
            &GAME_OVER_SOUNDS,
            ResourceManager::load_sound,
            ResourceManager::dispose_sound,
        );

        assert!(result.is_err());
        assert_eq!(resources.sounds().ref_count(&SoundKind::MenuMove), Some(1));
        assert!(!resources.sounds().contains(&SoundKind::MenuSelect));
        assert!(!resources.sounds().contains(&SoundKind::MenuSelectShoot));
    }

    #[test]
    fn test_all_sounds_load() {
        let source = FlakySource {
            broken: SoundKind::Jump,
        };
        let mut resources = ResourceManager::new(source, ResourceConfig::default());

        load_each(
            &mut resources,
            &MENU_SOUNDS,
            ResourceManager::load_sound,
            ResourceManager::dispose_sound,
        )
        .unwrap();
        assert_eq!(resources.sounds().len(), 2);
    }
}
