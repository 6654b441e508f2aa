//! Animated tile derivation
//!
//! Tiles opt into an animation through a property whose name contains
//! `Animation` (anything except `AnimationsPerSecond`). The property name is
//! the animation group and its integer value the tile's position in the
//! group. Every cell drawing a member of a group with at least two frames is
//! replaced by an animated tile cycling through the whole group.
//! `AnimationsPerSecond` on the cell's tile sets the playback rate.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::map::{AnimatedTile, MapTile, Properties, Property, StaticTile, TileMap};

/// Substring marking an animation group property
pub const ANIMATION_MARKER: &str = "Animation";
/// Property holding the playback rate of an animated tile
pub const ANIMATIONS_PER_SECOND: &str = "AnimationsPerSecond";

/// Counts gathered while deriving animated tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriveSummary {
    /// Animation groups found across all tile sets
    pub groups: usize,
    /// Cells replaced by animated tiles
    pub animated_cells: usize,
    /// Cells left static or animated with the default rate
    pub degraded_cells: usize,
}

/// The property naming a tile's animation group, if any.
///
/// Only the first matching property counts; a tile belongs to at most one group.
#[must_use]
pub fn animation_group(properties: &Properties) -> Option<&Property> {
    properties
        .iter()
        .find(|p| p.name.contains(ANIMATION_MARKER) && p.name != ANIMATIONS_PER_SECOND)
}

/// Replace cells of animated groups with synthesized animated tiles.
///
/// `default_frame_duration` is used for cells whose tile has no
/// `AnimationsPerSecond` property.
///
/// # Errors
///
/// Fails on an animation index or rate that does not parse, and on a cell
/// whose tile names a group no tile set contributed to.
pub fn derive_animated_tiles(
    map: &mut TileMap,
    default_frame_duration: f32,
) -> Result<DeriveSummary, TileAnimationError> {
    let groups = collect_groups(map)?;
    let mut summary = DeriveSummary {
        groups: groups.len(),
        ..DeriveSummary::default()
    };

    for layer in map.tile_layers_mut() {
        for cell in layer.cells_mut() {
            let replacement = match &cell.tile {
                MapTile::Static(tile) => {
                    animate(tile, &groups, default_frame_duration, &mut summary)?
                }
                MapTile::Animated(_) => None,
            };

            if let Some(animated) = replacement {
                cell.tile = MapTile::Animated(Rc::new(animated));
                summary.animated_cells += 1;
            }
        }
    }

    Ok(summary)
}

/// Gather every tile set member of every group, ordered by animation index
fn collect_groups(
    map: &TileMap,
) -> Result<FxHashMap<String, Vec<Rc<StaticTile>>>, TileAnimationError> {
    let mut members: FxHashMap<String, Vec<(i32, Rc<StaticTile>)>> = FxHashMap::default();

    for tile in map.tilesets.iter().flat_map(|set| &set.tiles) {
        let Some(property) = animation_group(&tile.properties) else {
            continue;
        };
        let index = property.value.trim().parse::<i32>().map_err(|_| {
            TileAnimationError::InvalidIndex {
                group: property.name.clone(),
                tile: tile.id,
                value: property.value.clone(),
            }
        })?;

        members
            .entry(property.name.clone())
            .or_default()
            .push((index, Rc::clone(tile)));
    }

    Ok(members
        .into_iter()
        .map(|(group, tiles)| {
            let frames = order_frames(&group, tiles);
            (group, frames)
        })
        .collect())
}

/// Sort members by index. A repeated index keeps the tile scanned last.
fn order_frames(group: &str, mut tiles: Vec<(i32, Rc<StaticTile>)>) -> Vec<Rc<StaticTile>> {
    // stable sort keeps scan order among equal indices
    tiles.sort_by_key(|(index, _)| *index);

    let mut ordered: Vec<(i32, Rc<StaticTile>)> = Vec::with_capacity(tiles.len());
    for (index, tile) in tiles {
        if let Some(last) = ordered.last_mut()
            && last.0 == index
        {
            // TODO: reject duplicate indices once existing maps are cleaned up
            log::warn!(
                "Animation {group} index {index} is used by tiles {} and {}, keeping tile {}",
                last.1.id,
                tile.id,
                tile.id
            );
            *last = (index, tile);
        } else {
            ordered.push((index, tile));
        }
    }

    ordered.into_iter().map(|(_, tile)| tile).collect()
}

fn animate(
    tile: &StaticTile,
    groups: &FxHashMap<String, Vec<Rc<StaticTile>>>,
    default_frame_duration: f32,
    summary: &mut DeriveSummary,
) -> Result<Option<AnimatedTile>, TileAnimationError> {
    let Some(property) = animation_group(&tile.properties) else {
        return Ok(None);
    };

    let frames = groups
        .get(&property.name)
        .ok_or_else(|| TileAnimationError::UnknownGroup {
            group: property.name.clone(),
            tile: tile.id,
        })?;

    if frames.len() < 2 {
        log::info!(
            "Animation {} has only one frame (tile {}), leaving the cell static",
            property.name,
            tile.id
        );
        summary.degraded_cells += 1;
        return Ok(None);
    }

    let frame_duration = match tile.properties.get(ANIMATIONS_PER_SECOND) {
        Some(value) => 1.0 / parse_rate(tile.id, value)?,
        None => {
            log::info!(
                "Animation {} on tile {} has no {ANIMATIONS_PER_SECOND}, using {default_frame_duration}s per frame",
                property.name,
                tile.id
            );
            summary.degraded_cells += 1;
            default_frame_duration
        }
    };

    Ok(Some(AnimatedTile::new(
        property.name.clone(),
        frames.iter().cloned(),
        frame_duration,
    )))
}

fn parse_rate(tile: u32, value: &str) -> Result<f32, TileAnimationError> {
    match value.trim().parse::<f32>() {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        _ => Err(TileAnimationError::InvalidRate {
            tile,
            value: value.to_string(),
        }),
    }
}

/// Inconsistent animation metadata in a tilemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileAnimationError {
    /// An animation index is not an integer
    InvalidIndex {
        group: String,
        tile: u32,
        value: String,
    },
    /// `AnimationsPerSecond` is not a positive number
    InvalidRate { tile: u32, value: String },
    /// A cell's tile names a group that no tile set contributed to
    UnknownGroup { group: String, tile: u32 },
}

impl fmt::Display for TileAnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { group, tile, value } => {
                write!(f, "tile {tile}: animation {group} index '{value}' is not an integer")
            }
            Self::InvalidRate { tile, value } => {
                write!(f, "tile {tile}: {ANIMATIONS_PER_SECOND} '{value}' is not a positive number")
            }
            Self::UnknownGroup { group, tile } => {
                write!(f, "tile {tile}: animation {group} has no frames in any tile set")
            }
        }
    }
}

impl std::error::Error for TileAnimationError {}
