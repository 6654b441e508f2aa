//! Tiled JSON documents
//!
//! Parses maps saved by the Tiled editor in its JSON format (`.tmj`/`.json`)
//! into a [`TileMap`]. Tile layers must use uncompressed array data; tile
//! sets must be embedded in the map.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use glam::UVec2;
use serde::Deserialize;
use serde_json::Value;

use super::map::{Cell, MapLayer, MapTile, Properties, StaticTile, TileLayer, TileMap, TileSet};
use crate::assets::AssetError;

const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;
const FLIPPED_VERTICALLY: u32 = 0x4000_0000;
const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;
/// Clears the flip bits and the hexagonal rotation bit
const GID_MASK: u32 = 0x0FFF_FFFF;

#[derive(Debug, Deserialize)]
struct RawMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    layers: Vec<RawLayer>,
    #[serde(default)]
    tilesets: Vec<RawTileset>,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    data: Option<Value>,
    /// Children of group layers
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Debug, Deserialize)]
struct RawTileset {
    firstgid: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    tiles: Vec<RawTile>,
}

#[derive(Debug, Deserialize)]
struct RawTile {
    id: u32,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    value: Value,
}

fn properties(raw: Vec<RawProperty>) -> Properties {
    raw.into_iter()
        .map(|property| {
            let value = match property.value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (property.name, value)
        })
        .collect()
}

/// Read and parse a Tiled JSON map file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a supported map
pub fn load_document(path: impl AsRef<Path>) -> Result<TileMap, AssetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| AssetError::io(path, &e))?;
    parse_document(&text, path)
}

/// Parse a Tiled JSON map.
///
/// `path` locates tile set images (relative to the map's directory) and
/// labels errors.
///
/// # Errors
///
/// Returns a decode error for invalid JSON and a malformed-asset error for
/// unsupported or inconsistent content
pub fn parse_document(text: &str, path: &Path) -> Result<TileMap, AssetError> {
    let raw: RawMap = serde_json::from_str(text).map_err(|e| AssetError::decode(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let tilesets = raw
        .tilesets
        .into_iter()
        .enumerate()
        .map(|(index, set)| build_tileset(index, set, base, path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut map = TileMap {
        size: UVec2::new(raw.width, raw.height),
        tile_size: UVec2::new(raw.tilewidth, raw.tileheight),
        tilesets,
        layers: Vec::new(),
        properties: properties(raw.properties),
    };

    let mut layers = Vec::new();
    for layer in raw.layers {
        flatten_layer(layer, &map, path, &mut layers)?;
    }
    map.layers = layers;

    log::debug!(
        "Parsed map {}: {}x{} tiles, {} tile sets, {} layers",
        path.display(),
        map.size.x,
        map.size.y,
        map.tilesets.len(),
        map.layers.len()
    );

    Ok(map)
}

fn build_tileset(
    index: usize,
    raw: RawTileset,
    base: &Path,
    path: &Path,
) -> Result<TileSet, AssetError> {
    if let Some(source) = raw.source {
        return Err(AssetError::malformed(
            path,
            format!("external tile set '{source}' is not supported, embed it in the map"),
        ));
    }
    let Some(image) = raw.image else {
        return Err(AssetError::malformed(
            path,
            format!("tile set '{}' has no image", raw.name),
        ));
    };
    if raw.columns == 0 {
        return Err(AssetError::malformed(
            path,
            format!("tile set '{}' has no columns", raw.name),
        ));
    }

    let size = UVec2::new(raw.tilewidth, raw.tileheight);
    let mut tiles = Vec::with_capacity(raw.tilecount.min(GID_MASK) as usize);
    for local in 0..raw.tilecount {
        let overflow = || {
            AssetError::malformed(
                path,
                format!("tile set '{}' tile {local} is out of the addressable range", raw.name),
            )
        };
        let gid = raw.firstgid.checked_add(local).ok_or_else(overflow)?;
        let position = tile_position(local, raw.columns, size, raw.margin, raw.spacing)
            .ok_or_else(overflow)?;
        tiles.push(StaticTile::new(gid, index, position, size));
    }

    for tile in raw.tiles {
        let Some(target) = tiles.get_mut(tile.id as usize) else {
            return Err(AssetError::malformed(
                path,
                format!(
                    "tile set '{}' describes tile {} but only has {}",
                    raw.name, tile.id, raw.tilecount
                ),
            ));
        };
        target.properties = properties(tile.properties);
    }

    Ok(TileSet {
        name: raw.name,
        first_gid: raw.firstgid,
        image: base.join(image),
        tiles: tiles.into_iter().map(Rc::new).collect(),
    })
}

/// Pixel position of a tile in its tile set image, `None` on overflow
fn tile_position(local: u32, columns: u32, size: UVec2, margin: u32, spacing: u32) -> Option<UVec2> {
    let axis = |cell: u32, extent: u32| {
        extent
            .checked_add(spacing)?
            .checked_mul(cell)?
            .checked_add(margin)
    };
    Some(UVec2::new(
        axis(local % columns, size.x)?,
        axis(local / columns, size.y)?,
    ))
}

fn flatten_layer(
    raw: RawLayer,
    map: &TileMap,
    path: &Path,
    out: &mut Vec<MapLayer>,
) -> Result<(), AssetError> {
    match raw.kind.as_str() {
        "tilelayer" => out.push(MapLayer::Tiles(build_tile_layer(raw, map, path)?)),
        "group" => {
            for child in raw.layers {
                flatten_layer(child, map, path, out)?;
            }
        }
        _ => out.push(MapLayer::Other {
            name: raw.name,
            kind: raw.kind,
        }),
    }
    Ok(())
}

fn build_tile_layer(raw: RawLayer, map: &TileMap, path: &Path) -> Result<TileLayer, AssetError> {
    let Some(Value::Array(data)) = raw.data else {
        return Err(AssetError::malformed(
            path,
            format!("layer '{}' must store its tiles as a plain array", raw.name),
        ));
    };

    let expected = (raw.width as usize) * (raw.height as usize);
    if data.len() != expected {
        return Err(AssetError::malformed(
            path,
            format!(
                "layer '{}' has {} tiles, expected {}x{}",
                raw.name,
                data.len(),
                raw.width,
                raw.height
            ),
        ));
    }

    let mut layer = TileLayer::new(raw.name, raw.width, raw.height);
    for (i, value) in data.iter().enumerate() {
        let raw_gid = value
            .as_u64()
            .and_then(|gid| u32::try_from(gid).ok())
            .ok_or_else(|| {
                AssetError::malformed(path, format!("layer '{}' has invalid gid {value}", layer.name))
            })?;

        let gid = raw_gid & GID_MASK;
        if gid == 0 {
            continue;
        }

        let tile = map.tile(gid).ok_or_else(|| {
            AssetError::malformed(
                path,
                format!("layer '{}' uses gid {gid} outside every tile set", layer.name),
            )
        })?;

        let cell = Cell {
            tile: MapTile::Static(Rc::clone(tile)),
            flip_horizontally: raw_gid & FLIPPED_HORIZONTALLY != 0,
            flip_vertically: raw_gid & FLIPPED_VERTICALLY != 0,
            flip_diagonally: raw_gid & FLIPPED_DIAGONALLY != 0,
        };

        let x = (i % raw.width as usize) as u32;
        let y = (i / raw.width as usize) as u32;
        layer.set_cell(x, y, Some(cell));
    }

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"{
        "width": 3, "height": 2, "tilewidth": 16, "tileheight": 16,
        "properties": [{ "name": "music", "type": "string", "value": "sparkman" }],
        "tilesets": [{
            "firstgid": 1, "name": "stage", "image": "stage.png",
            "tilewidth": 16, "tileheight": 16, "columns": 4, "tilecount": 8,
            "margin": 1, "spacing": 2,
            "tiles": [
                { "id": 0, "properties": [
                    { "name": "AnimationWater", "type": "int", "value": 1 },
                    { "name": "AnimationsPerSecond", "type": "string", "value": "4" }
                ]},
                { "id": 5, "properties": [{ "name": "AnimationWater", "type": "string", "value": "2" }] }
            ]
        }],
        "layers": [
            { "type": "tilelayer", "name": "ground", "width": 3, "height": 2,
              "data": [1, 0, 6, 0, 2147483650, 8] },
            { "type": "group", "name": "decor", "layers": [
                { "type": "objectgroup", "name": "spawns" }
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_map() {
        let map = parse_document(MAP, Path::new("maps/stage.tmj")).unwrap();

        assert_eq!(map.size, UVec2::new(3, 2));
        assert_eq!(map.properties.get("music"), Some("sparkman"));
        assert_eq!(map.tilesets[0].image, Path::new("maps/stage.png"));
        assert_eq!(map.tilesets[0].tiles.len(), 8);
        assert_eq!(map.layers.len(), 2);
        assert!(matches!(&map.layers[1], MapLayer::Other { kind, .. } if kind == "objectgroup"));

        // group layers are flattened, their children keep their own names
        assert!(matches!(map.layer("ground"), Some(MapLayer::Tiles(_))));
        assert!(map.layer("spawns").is_some());
        assert!(map.layer("decor").is_none());
    }

    #[test]
    fn test_tile_geometry_and_properties() {
        let map = parse_document(MAP, Path::new("stage.tmj")).unwrap();

        // local id 5 sits at column 1, row 1 with margin 1 and spacing 2
        let tile = map.tile(6).unwrap();
        assert_eq!(tile.position, UVec2::new(1 + 18, 1 + 18));
        assert_eq!(tile.properties.get("AnimationWater"), Some("2"));

        // non-string values are kept as their JSON text
        assert_eq!(map.tile(1).unwrap().properties.get("AnimationWater"), Some("1"));
    }

    #[test]
    fn test_cells_and_flip_flags() {
        let map = parse_document(MAP, Path::new("stage.tmj")).unwrap();
        let layer = map.tile_layers().next().unwrap();

        assert!(layer.cell(1, 0).is_none());
        assert_eq!(layer.cell(2, 0).unwrap().tile.as_static().unwrap().id, 6);

        let flipped = layer.cell(1, 1).unwrap();
        assert!(flipped.flip_horizontally);
        assert!(!flipped.flip_vertically);
        assert_eq!(flipped.tile.as_static().unwrap().id, 2);

        // cells share the tile set's tiles
        let shared = layer.cell(0, 0).unwrap().tile.as_static().unwrap();
        assert!(Rc::ptr_eq(shared, map.tile(1).unwrap()));
    }

    #[test]
    fn test_unknown_gid_is_malformed() {
        let text = MAP.replace("2147483650, 8", "2147483650, 42");
        let err = parse_document(&text, Path::new("stage.tmj")).unwrap_err();
        assert!(matches!(err, AssetError::Malformed { .. }));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_gid_overflow_is_malformed() {
        let text = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "tilesets": [{ "firstgid": 4294967295, "name": "edge", "image": "edge.png",
                "tilewidth": 8, "tileheight": 8, "columns": 2, "tilecount": 2 }],
            "layers": [] }"#;
        let err = parse_document(text, Path::new("stage.tmj")).unwrap_err();
        assert!(matches!(err, AssetError::Malformed { .. }));
    }

    #[test]
    fn test_tile_geometry_overflow_is_malformed() {
        let text = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "tilesets": [{ "firstgid": 1, "name": "wide", "image": "wide.png",
                "tilewidth": 4294967295, "tileheight": 8, "spacing": 1,
                "columns": 2, "tilecount": 2 }],
            "layers": [] }"#;
        let err = parse_document(text, Path::new("stage.tmj")).unwrap_err();
        assert!(matches!(err, AssetError::Malformed { .. }));
        assert!(err.to_string().contains("wide"));
    }

    #[test]
    fn test_external_tileset_rejected() {
        let text = r#"{ "width": 1, "height": 1, "tilewidth": 8, "tileheight": 8,
            "tilesets": [{ "firstgid": 1, "source": "stage.tsj" }], "layers": [] }"#;
        let err = parse_document(text, Path::new("stage.tmj")).unwrap_err();
        assert!(matches!(err, AssetError::Malformed { .. }));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = parse_document("{ not json", Path::new("stage.tmj")).unwrap_err();
        assert!(matches!(err, AssetError::DecodeError { .. }));
    }
}
