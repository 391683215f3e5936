//! Deterministic tactical combat rules shared across hosts.
//!
//! `skirmish-core` defines the canonical simulation (grid state, search,
//! area resolution, skill pipelines, turn sequencing) as pure synchronous
//! APIs. State mutation flows through [`engine::TurnEngine`] and
//! [`skill::PipelineRun`]; side effects for the presentation layer come out
//! as drained [`events::Event`]s, never as callbacks.
pub mod area;
pub mod combat;
pub mod config;
pub mod engine;
pub mod events;
pub mod search;
pub mod skill;
pub mod state;

pub use area::{AreaPattern, CellColor, PatternCell, ResolvedCell};
pub use combat::{DamageType, DiceOracle, PcgDice, dice_multiplier, effective_damage};
pub use config::GameConfig;
pub use engine::TurnEngine;
pub use events::{Event, EventQueue, SkipReason};
pub use skill::{
    AnimationTrigger, EasingCurve, PipelineRun, PipelineStatus, ReleaseKind, SkillDef, SkillId,
    SkillOracle, Step, TeamFilter,
};
pub use state::{
    BoardError, BoardState, CellState, Character, EntitiesState, EntityId, Facing, GameState,
    GridMap, MapDimensions, MapOracle, MatchPhase, Position, Resistances, Team, TurnState,
    UnitState,
};
