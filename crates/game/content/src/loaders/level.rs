//! Level data loader.
//!
//! Reads Tiled-style JSON and keeps only what combat needs: map bounds and
//! the blocked tile set. Blocked tiles come from two places:
//!
//! - an object layer named `collision`, where each object marks one tile,
//!   either through explicit `tileX`/`tileY` properties or through its pixel
//!   position divided by the tile size;
//! - tile layers carrying a truthy `collision` property, where every non-empty
//!   tile index blocks its cell.
//!
//! Markers outside the map bounds are dropped.

use std::path::Path;

use combat_core::{CollisionMap, TilePos};
use serde::Deserialize;
use serde_json::Value;

use crate::loaders::{LoadResult, read_file};

const COLLISION_LAYER: &str = "collision";
const COLLISION_FLAG: &str = "collision";

#[derive(Debug, Deserialize)]
struct LevelJson {
    width: u32,
    height: u32,
    #[serde(default = "default_tile_size")]
    tilewidth: u32,
    #[serde(default = "default_tile_size")]
    tileheight: u32,
    #[serde(default)]
    layers: Vec<LayerJson>,
}

fn default_tile_size() -> u32 {
    32
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum LayerJson {
    #[serde(rename = "objectgroup")]
    Objects {
        #[serde(default)]
        name: String,
        #[serde(default)]
        objects: Vec<ObjectJson>,
    },
    #[serde(rename = "tilelayer")]
    Tiles {
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        data: Vec<u32>,
        #[serde(default)]
        properties: Vec<PropertyJson>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ObjectJson {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    properties: Vec<PropertyJson>,
}

#[derive(Debug, Deserialize)]
struct PropertyJson {
    name: String,
    #[serde(default)]
    value: Value,
}

fn property<'a>(properties: &'a [PropertyJson], name: &str) -> Option<&'a Value> {
    properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| &p.value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

fn as_coord(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ObjectJson {
    fn tile(&self, tile_width: u32, tile_height: u32) -> TilePos {
        let explicit = property(&self.properties, "tileX")
            .and_then(as_coord)
            .zip(property(&self.properties, "tileY").and_then(as_coord));
        match explicit {
            Some((x, y)) => TilePos::new(x, y),
            None => TilePos::new(
                (self.x / f64::from(tile_width.max(1))).floor() as i32,
                (self.y / f64::from(tile_height.max(1))).floor() as i32,
            ),
        }
    }
}

/// Loader for collision maps from level JSON.
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<CollisionMap> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load level {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<CollisionMap> {
        let level: LevelJson = serde_json::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level JSON: {}", e))?;
        if level.width == 0 || level.height == 0 {
            anyhow::bail!("Level has empty bounds {}x{}", level.width, level.height);
        }

        let mut map = CollisionMap::new(level.width, level.height);
        let mut markers = Vec::new();
        for layer in &level.layers {
            match layer {
                LayerJson::Objects { name, objects } if name.eq_ignore_ascii_case(COLLISION_LAYER) => {
                    markers.extend(
                        objects
                            .iter()
                            .map(|object| object.tile(level.tilewidth, level.tileheight)),
                    );
                }
                LayerJson::Tiles {
                    width,
                    data,
                    properties,
                } if property(properties, COLLISION_FLAG).is_some_and(is_truthy) => {
                    let columns = width.unwrap_or(level.width).max(1) as usize;
                    markers.extend(data.iter().enumerate().filter(|(_, gid)| **gid != 0).map(
                        |(index, _)| TilePos::new((index % columns) as i32, (index / columns) as i32),
                    ));
                }
                _ => {}
            }
        }

        markers.retain(|tile| map.contains(*tile));
        map.blocked.extend(markers);
        Ok(map)
    }
}
