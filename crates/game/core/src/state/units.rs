//! Units and their stats.

use arrayvec::ArrayVec;
use std::collections::BTreeMap;

use crate::combat::DamageType;
use crate::config::GameConfig;
use crate::skill::SkillId;

use super::{EntityId, Facing, Position, Team, UnitState};

type SkillSlots = ArrayVec<SkillId, { GameConfig::MAX_SKILLS }>;

/// Fractional per-damage-type reduction. Values are clamped to 0.0..=1.0;
/// unmapped types read as 0.0 (no reduction).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resistances(BTreeMap<DamageType, f32>);

impl Resistances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, damage_type: DamageType, fraction: f32) {
        self.0.insert(damage_type, fraction.clamp(0.0, 1.0));
    }

    pub fn with(mut self, damage_type: DamageType, fraction: f32) -> Self {
        self.set(damage_type, fraction);
        self
    }

    pub fn resistance_for(&self, damage_type: DamageType) -> f32 {
        self.0.get(&damage_type).copied().unwrap_or(0.0)
    }
}

impl FromIterator<(DamageType, f32)> for Resistances {
    fn from_iter<I: IntoIterator<Item = (DamageType, f32)>>(iter: I) -> Self {
        let mut resistances = Self::new();
        for (damage_type, fraction) in iter {
            resistances.set(damage_type, fraction);
        }
        resistances
    }
}

/// A combat unit: stats, per-turn state machine, cached board position and
/// configured skills.
///
/// `position` is a lookup key into [`super::BoardState`] occupancy, which is
/// the canonical record; mutation goes through `GameState::move_unit`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: EntityId,
    pub team: Team,
    pub health: i32,
    pub current_health: i32,
    pub attack: i32,
    /// Movement budget per turn, in cells.
    pub movement_range: u32,
    /// Movement interpolation speed, in cells per second.
    pub move_speed: f32,
    pub resistances: Resistances,
    pub state: UnitState,
    pub facing: Facing,
    pub position: Position,
    pub skills: SkillSlots,
}

impl Character {
    pub fn new(id: EntityId, team: Team, position: Position) -> Self {
        Self {
            id,
            team,
            health: GameConfig::DEFAULT_HEALTH,
            current_health: GameConfig::DEFAULT_HEALTH,
            attack: GameConfig::DEFAULT_ATTACK,
            movement_range: GameConfig::DEFAULT_MOVEMENT_RANGE,
            move_speed: GameConfig::DEFAULT_MOVE_SPEED,
            resistances: Resistances::default(),
            state: UnitState::default(),
            facing: Facing::default(),
            position,
            skills: SkillSlots::new(),
        }
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self.current_health = health;
        self
    }

    pub fn with_attack(mut self, attack: i32) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_movement_range(mut self, range: u32) -> Self {
        self.movement_range = range;
        self
    }

    pub fn with_resistances(mut self, resistances: Resistances) -> Self {
        self.resistances = resistances;
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        for skill in skills {
            if self.skills.try_push(skill).is_err() {
                break;
            }
        }
        self
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }
}

/// Id-ordered unit storage.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitiesState {
    units: Vec<Character>,
}

impl EntitiesState {
    pub fn unit(&self, id: EntityId) -> Option<&Character> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    pub fn insert(&mut self, unit: Character) {
        match self.units.binary_search_by_key(&unit.id, |u| u.id) {
            Ok(index) => self.units[index] = unit,
            Err(index) => self.units.insert(index, unit),
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Character> {
        let index = self.units.iter().position(|unit| unit.id == id)?;
        Some(self.units.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.units.iter()
    }

    pub fn on_team(&self, team: Team) -> impl Iterator<Item = &Character> {
        self.units.iter().filter(move |unit| unit.team == team)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
