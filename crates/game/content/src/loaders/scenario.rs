//! Scenario loader: unit rosters and their spawn placement.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::{
    Character, DamageType, EntityId, GameConfig, Position, Resistances, SkillId, Team,
};

use crate::loaders::{LoadResult, read_file};

fn default_health() -> i32 {
    GameConfig::DEFAULT_HEALTH
}

fn default_attack() -> i32 {
    GameConfig::DEFAULT_ATTACK
}

fn default_movement_range() -> u32 {
    GameConfig::DEFAULT_MOVEMENT_RANGE
}

/// One unit entry in a scenario file. Stats fall back to the engine
/// defaults when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: u32,
    pub team: Team,
    pub position: (i32, i32),
    #[serde(default = "default_health")]
    pub health: i32,
    #[serde(default = "default_attack")]
    pub attack: i32,
    #[serde(default = "default_movement_range")]
    pub movement_range: u32,
    #[serde(default)]
    pub resistances: Vec<(DamageType, f32)>,
    #[serde(default)]
    pub skills: Vec<u16>,
}

impl UnitSpec {
    /// Builds the unit this spec describes. The spawn cell is returned
    /// alongside so the host can place it (or snap it) onto the board.
    pub fn build(&self) -> (Character, Position) {
        let position = Position::new(self.position.0, self.position.1);
        let unit = Character::new(EntityId(self.id), self.team, position)
            .with_health(self.health)
            .with_attack(self.attack)
            .with_movement_range(self.movement_range)
            .with_resistances(self.resistances.iter().copied().collect::<Resistances>())
            .with_skills(self.skills.iter().map(|id| SkillId(*id)));
        (unit, position)
    }
}

/// Scenario structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioData {
    pub name: String,
    pub units: Vec<UnitSpec>,
}

/// Loader for scenario data from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Loads the builtin two-sided skirmish scenario.
    pub fn builtin() -> LoadResult<ScenarioData> {
        Self::from_str(include_str!("../../data/scenarios/skirmish.ron"))
    }

    /// Loads scenario data from a RON file on disk.
    pub fn load(path: &Path) -> LoadResult<ScenarioData> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    fn from_str(content: &str) -> LoadResult<ScenarioData> {
        let data: ScenarioData = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        let mut seen = std::collections::BTreeSet::new();
        for unit in &data.units {
            if !seen.insert(unit.id) {
                anyhow::bail!("Duplicate unit id {} in scenario {}", unit.id, data.name);
            }
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_has_both_teams() {
        let scenario = ScenarioLoader::builtin().expect("builtin scenario must parse");
        assert!(
            scenario
                .units
                .iter()
                .any(|unit| unit.team == Team::Player)
        );
        assert!(scenario.units.iter().any(|unit| unit.team == Team::Enemy));
    }

    #[test]
    fn unit_spec_defaults_apply() {
        let spec: UnitSpec =
            ron::from_str("(id: 1, team: Player, position: (0, 0))").expect("minimal spec parses");
        let (unit, position) = spec.build();
        assert_eq!(position, Position::ORIGIN);
        assert_eq!(unit.health, GameConfig::DEFAULT_HEALTH);
        assert_eq!(unit.attack, GameConfig::DEFAULT_ATTACK);
        assert_eq!(unit.movement_range, GameConfig::DEFAULT_MOVEMENT_RANGE);
        assert!(unit.skills.is_empty());
    }
}
