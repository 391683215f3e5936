use std::fmt;

/// Unique identifier for any unit tracked in the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid position expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Straight-line distance, used for interpolated movement timing.
    pub fn euclidean_distance(self, other: Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// The four cardinal neighbours: up, down, left, right.
    pub fn neighbors(self) -> [Position; 4] {
        [
            self.offset_by(0, 1),
            self.offset_by(0, -1),
            self.offset_by(-1, 0),
            self.offset_by(1, 0),
        ]
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Side a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn opposing(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

/// One of the four axis-aligned directions a unit (or an area pattern) can face.
///
/// Area patterns are authored facing [`Facing::Up`], i.e. with forward = (0, 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Up,
    Right,
    Down,
    Left,
}

impl Facing {
    /// Unit offset of this direction in cell coordinates.
    pub const fn unit_offset(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, 1),
            Facing::Right => (1, 0),
            Facing::Down => (0, -1),
            Facing::Left => (-1, 0),
        }
    }

    /// Snaps an arbitrary direction vector to the nearest cardinal.
    ///
    /// The plane is split into four 90-degree quadrants centred on the axes:
    /// [45, 135) is up, [135, 225) is left, [225, 315) is down and the rest
    /// is right. Returns `None` for the zero vector, which has no direction.
    pub fn from_vector(dx: f32, dy: f32) -> Option<Facing> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        let mut angle = dy.atan2(dx).to_degrees();
        if angle < 0.0 {
            angle += 360.0;
        }
        Some(if (45.0..135.0).contains(&angle) {
            Facing::Up
        } else if (135.0..225.0).contains(&angle) {
            Facing::Left
        } else if (225.0..315.0).contains(&angle) {
            Facing::Down
        } else {
            Facing::Right
        })
    }

    /// Rotates a pattern offset from the authored forward (0, 1) into this
    /// facing. Quarter-turn matrices only; no arbitrary angles.
    pub const fn rotate_offset(self, offset: (i32, i32)) -> (i32, i32) {
        let (x, y) = offset;
        match self {
            Facing::Up => (x, y),
            Facing::Right => (y, -x),
            Facing::Down => (-x, -y),
            Facing::Left => (-y, x),
        }
    }
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Down
    }
}

/// Presentation-facing annotation attached to a cell.
///
/// Recomputed whenever reachability or targeting changes; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    Default,
    /// Within the acting unit's movement range.
    Movable,
    /// Hovered / selected by the input layer.
    Selected,
    /// Candidate release cell for the selected skill.
    SkillRange,
    /// Cell the selected skill would actually affect.
    SkillArea,
}

impl Default for CellState {
    fn default() -> Self {
        CellState::Default
    }
}

/// Per-unit state machine. A living unit cycles
/// `Idle -> Waiting -> {Moving | SelectingSkill | Acting} -> Idle` each turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitState {
    Idle,
    /// Waiting for a command (player input or AI decision).
    Waiting,
    Moving,
    SelectingSkill,
    Acting,
}

impl Default for UnitState {
    fn default() -> Self {
        UnitState::Idle
    }
}
