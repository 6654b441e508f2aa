//! Tilemap structure
//!
//! Tile sets own the static tiles; layer cells share them. After loading,
//! some cells point at synthesized animated tiles instead.

use std::path::PathBuf;
use std::rc::Rc;

use glam::UVec2;
use smallvec::SmallVec;

/// A single named property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// Open-ended property bag that keeps authoring order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<Property>,
}

impl Properties {
    /// Create an empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property, replacing an existing value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.entries.push(Property { name, value }),
        }
    }

    /// Look up a value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Check if a property is set
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|p| p.name == name)
    }

    /// Iterate in authoring order
    pub fn iter(&self) -> impl Iterator<Item = &Property> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

/// A tile image cut from a tile set
#[derive(Debug, Clone, PartialEq)]
pub struct StaticTile {
    /// Global tile id
    pub id: u32,
    /// Index of the owning tile set
    pub tileset: usize,
    /// Top-left corner in the tile set image
    pub position: UVec2,
    /// Size in pixels
    pub size: UVec2,
    pub properties: Properties,
}

impl StaticTile {
    /// Create a tile with no properties
    #[must_use]
    pub fn new(id: u32, tileset: usize, position: UVec2, size: UVec2) -> Self {
        Self {
            id,
            tileset,
            position,
            size,
            properties: Properties::new(),
        }
    }

    /// Builder-style property set
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name, value);
        self
    }
}

/// A tile cycling through static frames at a fixed rate
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedTile {
    /// Animation group the frames were collected from
    group: String,
    frames: SmallVec<[Rc<StaticTile>; 8]>,
    /// Seconds each frame is shown
    frame_duration: f32,
}

impl AnimatedTile {
    /// Create an animated tile from ordered frames
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        frames: impl IntoIterator<Item = Rc<StaticTile>>,
        frame_duration: f32,
    ) -> Self {
        Self {
            group: group.into(),
            frames: frames.into_iter().collect(),
            frame_duration,
        }
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Frames in playback order
    #[must_use]
    pub fn frames(&self) -> &[Rc<StaticTile>] {
        &self.frames
    }

    #[must_use]
    pub const fn frame_duration(&self) -> f32 {
        self.frame_duration
    }

    /// Length of one full cycle in seconds
    #[must_use]
    pub fn cycle_duration(&self) -> f32 {
        self.frame_duration * self.frames.len() as f32
    }

    /// Frame shown `elapsed` seconds into a looping playback
    #[must_use]
    pub fn frame_at(&self, elapsed: f32) -> Option<&Rc<StaticTile>> {
        if self.frames.is_empty() {
            return None;
        }
        let step = (elapsed.max(0.0) / self.frame_duration) as usize;
        self.frames.get(step % self.frames.len())
    }
}

/// What a cell draws
#[derive(Debug, Clone, PartialEq)]
pub enum MapTile {
    Static(Rc<StaticTile>),
    Animated(Rc<AnimatedTile>),
}

impl MapTile {
    /// Get the static tile, if this is one
    #[must_use]
    pub fn as_static(&self) -> Option<&Rc<StaticTile>> {
        match self {
            Self::Static(tile) => Some(tile),
            Self::Animated(_) => None,
        }
    }

    /// Get the animated tile, if this is one
    #[must_use]
    pub fn as_animated(&self) -> Option<&Rc<AnimatedTile>> {
        match self {
            Self::Static(_) => None,
            Self::Animated(tile) => Some(tile),
        }
    }
}

/// One grid position of a tile layer
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub tile: MapTile,
    pub flip_horizontally: bool,
    pub flip_vertically: bool,
    pub flip_diagonally: bool,
}

impl Cell {
    /// Create an unflipped cell
    #[must_use]
    pub fn new(tile: MapTile) -> Self {
        Self {
            tile,
            flip_horizontally: false,
            flip_vertically: false,
            flip_diagonally: false,
        }
    }
}

/// A grid of cells, row-major from the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    width: u32,
    height: u32,
    cells: Vec<Option<Cell>>,
}

impl TileLayer {
    /// Create an empty layer
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            cells: vec![None; (width as usize) * (height as usize)],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    /// Get the cell at a grid position
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        self.index(x, y).and_then(|i| self.cells[i].as_ref())
    }

    /// Place or clear a cell. Out-of-range positions are ignored.
    pub fn set_cell(&mut self, x: u32, y: u32, cell: Option<Cell>) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Iterate over occupied cells
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().flatten()
    }

    /// Iterate mutably over occupied cells
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut().flatten()
    }
}

/// Any map layer
#[derive(Debug, Clone, PartialEq)]
pub enum MapLayer {
    Tiles(TileLayer),
    /// Object, image and group layers, kept by name only
    Other { name: String, kind: String },
}

impl MapLayer {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Tiles(layer) => &layer.name,
            Self::Other { name, .. } => name,
        }
    }
}

/// A tile set: one image cut into a grid of tiles
#[derive(Debug, Clone, PartialEq)]
pub struct TileSet {
    pub name: String,
    /// Global id of the first tile
    pub first_gid: u32,
    /// Image the tiles are cut from
    pub image: PathBuf,
    pub tiles: Vec<Rc<StaticTile>>,
}

impl TileSet {
    /// Look up a tile by global id
    #[must_use]
    pub fn tile(&self, gid: u32) -> Option<&Rc<StaticTile>> {
        let local = gid.checked_sub(self.first_gid)?;
        self.tiles.get(local as usize)
    }
}

/// A parsed tilemap
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    /// Map size in tiles
    pub size: UVec2,
    /// Tile size in pixels
    pub tile_size: UVec2,
    pub tilesets: Vec<TileSet>,
    pub layers: Vec<MapLayer>,
    pub properties: Properties,
}

impl TileMap {
    /// Look up a tile by global id across all tile sets
    #[must_use]
    pub fn tile(&self, gid: u32) -> Option<&Rc<StaticTile>> {
        self.tilesets.iter().find_map(|set| set.tile(gid))
    }

    /// Find a layer by name
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|layer| layer.name() == name)
    }

    /// Iterate over tile layers
    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> + '_ {
        self.layers.iter().filter_map(|layer| match layer {
            MapLayer::Tiles(tiles) => Some(tiles),
            MapLayer::Other { .. } => None,
        })
    }

    /// Iterate mutably over tile layers
    pub fn tile_layers_mut(&mut self) -> impl Iterator<Item = &mut TileLayer> + '_ {
        self.layers.iter_mut().filter_map(|layer| match layer {
            MapLayer::Tiles(tiles) => Some(tiles),
            MapLayer::Other { .. } => None,
        })
    }
}
