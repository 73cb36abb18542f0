//! Per-process collision cache served through [`combat_core::MapOracle`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use combat_core::{CollisionMap, MapId, MapOracle};
use tracing::{debug, warn};

use crate::loaders::LevelLoader;

/// Loads `{maps_dir}/{map_id}.json` on first use and keeps the result for the
/// lifetime of the process. Misses are cached too, so a missing level is only
/// reported once.
pub struct CollisionCache {
    maps_dir: PathBuf,
    entries: RwLock<HashMap<MapId, Option<Arc<CollisionMap>>>>,
}

impl CollisionCache {
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a map without touching the disk.
    pub fn insert(&self, map_id: MapId, map: CollisionMap) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(map_id, Some(Arc::new(map)));
        }
    }

    /// Builder form of [`Self::insert`].
    pub fn with_map(self, map_id: impl Into<MapId>, map: CollisionMap) -> Self {
        self.insert(map_id.into(), map);
        self
    }

    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    /// Number of map ids looked up so far, hits and misses alike.
    pub fn cached(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    fn level_path(&self, map_id: &MapId) -> Option<PathBuf> {
        let name = map_id.as_str();
        let plain = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !name.contains("..");
        plain.then(|| self.maps_dir.join(format!("{name}.json")))
    }

    fn load(&self, map_id: &MapId) -> Option<Arc<CollisionMap>> {
        let Some(path) = self.level_path(map_id) else {
            warn!(target: "content::collision", map = %map_id, "rejected map id");
            return None;
        };
        match LevelLoader::load(&path) {
            Ok(map) => {
                debug!(
                    target: "content::collision",
                    map = %map_id,
                    width = map.width,
                    height = map.height,
                    blocked = map.blocked.len(),
                    "collision map loaded"
                );
                Some(Arc::new(map))
            }
            Err(error) => {
                warn!(target: "content::collision", map = %map_id, %error, "collision map unavailable");
                None
            }
        }
    }
}

impl MapOracle for CollisionCache {
    fn collision(&self, map_id: &MapId) -> Option<Arc<CollisionMap>> {
        if let Ok(entries) = self.entries.read()
            && let Some(entry) = entries.get(map_id)
        {
            return entry.clone();
        }

        let loaded = self.load(map_id);
        if let Ok(mut entries) = self.entries.write() {
            return entries.entry(map_id.clone()).or_insert(loaded).clone();
        }
        loaded
    }
}
