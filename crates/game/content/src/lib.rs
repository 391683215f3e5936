//! Data-driven combat content and loaders.
//!
//! This crate houses static game content and provides loaders for RON data
//! files:
//! - Skill definitions (release rules, area patterns, step scripts)
//! - Map layouts (data-driven via RON)
//! - Scenarios (unit rosters and spawn placement)
//!
//! Content is consumed by the runtime through the core's oracle traits and
//! never appears in game state. All loaders deserialize directly into
//! skirmish-core types via serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{MapLoader, ScenarioData, ScenarioLoader, SkillRegistry, UnitSpec};
