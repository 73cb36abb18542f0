//! Player profile loader.
//!
//! Profiles live outside combat; the runtime only needs them to seed its
//! profile store in local runs and tests.

use std::path::Path;

use combat_core::PlayerProfile;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Profile list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFile {
    pub profiles: Vec<PlayerProfile>,
}

/// Loader for player profiles from RON files.
pub struct ProfileLoader;

impl ProfileLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<PlayerProfile>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<PlayerProfile>> {
        let file: ProfileFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse profile RON: {}", e))?;

        for profile in &file.profiles {
            if profile.hp > profile.hp_max {
                anyhow::bail!(
                    "Profile {} has {} hp above its maximum of {}",
                    profile.player_id,
                    profile.hp,
                    profile.hp_max
                );
            }
        }
        Ok(file.profiles)
    }
}
