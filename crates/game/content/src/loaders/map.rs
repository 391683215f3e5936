//! Map data loader.
//!
//! Loads pure terrain data from map RON files. Unit placement is handled
//! separately via scenario files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::{GridMap, Position};

use crate::loaders::{LoadResult, read_file};

/// Map data structure for RON files (terrain only).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MapDataRon {
    dimensions: (u32, u32),
    #[serde(default)]
    blocked: Vec<(i32, i32)>,
}

/// Loader for map data from RON files.
pub struct MapLoader;

impl MapLoader {
    /// Loads the builtin arena map from embedded RON data.
    pub fn builtin() -> LoadResult<GridMap> {
        Self::from_str(include_str!("../../data/maps/arena.ron"))
    }

    /// Loads map data from a RON file on disk.
    pub fn load(path: &Path) -> LoadResult<GridMap> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    fn from_str(content: &str) -> LoadResult<GridMap> {
        let data: MapDataRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map RON: {}", e))?;
        let (width, height) = data.dimensions;
        Ok(GridMap::new(width, height)
            .with_blocked(data.blocked.into_iter().map(|(x, y)| Position::new(x, y))))
    }
}
