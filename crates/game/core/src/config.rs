//! Simulation-wide limits and defaults.

/// Compile-time limits and default stats. Kept in one place so data loaders
/// and tests agree on bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameConfig;

impl GameConfig {
    /// Maximum skills a single unit can carry.
    pub const MAX_SKILLS: usize = 8;

    pub const DEFAULT_HEALTH: i32 = 100;
    pub const DEFAULT_ATTACK: i32 = 10;
    /// Default movement budget per turn, in cells.
    pub const DEFAULT_MOVEMENT_RANGE: u32 = 3;
    /// Default movement interpolation speed, in cells per second.
    pub const DEFAULT_MOVE_SPEED: f32 = 3.0;
}
