//! Content loaders for reading combat data from RON files.
//!
//! Each loader converts a RON file (embedded or on disk) into skirmish-core
//! types. The builtin data under `data/` is embedded with `include_str!` so
//! hosts work out of the box without a content directory.

pub mod map;
pub mod scenario;
pub mod skills;

pub use map::MapLoader;
pub use scenario::{ScenarioData, ScenarioLoader, UnitSpec};
pub use skills::SkillRegistry;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
