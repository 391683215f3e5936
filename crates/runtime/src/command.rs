//! Turn commands and the providers that issue them.
//!
//! A [`CommandProvider`] decides what the active unit does with its turn.
//! The session asks the provider once per idle tick; interactive hosts
//! implement the trait over their input state, and [`AiController`] covers
//! enemy turns and headless simulation.

use skirmish_core::{
    CellState, Character, EntityId, Facing, GameState, MapOracle, Position, ReleaseKind, SkillDef,
    SkillId, SkillOracle, Step, area,
};

/// What the active unit does next.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Walk to a cell inside the annotated movement range.
    Move { destination: Position },
    /// Cast a skill at a release cell. `facing` is only meaningful for
    /// self-centered skills; `None` keeps the unit's current facing.
    Cast {
        skill: SkillId,
        release: Position,
        facing: Option<Facing>,
    },
    EndTurn,
}

/// Read-only view handed to providers when their unit's turn comes up.
pub struct TurnView<'a> {
    pub state: &'a GameState,
    pub map: &'a dyn MapOracle,
    pub skills: &'a dyn SkillOracle,
    pub unit: EntityId,
}

pub trait CommandProvider {
    fn decide(&mut self, view: &TurnView<'_>) -> Command;
}

/// Baseline opponent: close on the nearest opposing unit and cast the first
/// equipped skill that can reach it.
///
/// Stateless across turns. Whether the unit already moved this turn is read
/// off the board: the session clears the `Movable` annotation once movement
/// completes, so an empty annotation set means walking is spent.
#[derive(Clone, Copy, Debug, Default)]
pub struct AiController;

impl AiController {
    pub fn new() -> Self {
        Self
    }

    fn try_cast(
        &self,
        view: &TurnView<'_>,
        me: &Character,
        target: &Character,
        def: &SkillDef,
    ) -> Option<Command> {
        match def.release {
            ReleaseKind::TargetUnit { range } | ReleaseKind::FreeSelection { range } => {
                (me.position.manhattan_distance(target.position) <= range).then_some(
                    Command::Cast {
                        skill: def.id,
                        release: target.position,
                        facing: None,
                    },
                )
            }
            ReleaseKind::SelfCentered => {
                let dx = (target.position.x - me.position.x) as f32;
                let dy = (target.position.y - me.position.y) as f32;
                let facing = Facing::from_vector(dx, dy)?;
                let resolved = area::resolve(view.map, me.position, &def.pattern, Some(facing));
                let damage_codes: Vec<i32> = def
                    .steps
                    .iter()
                    .filter_map(|step| match step {
                        Step::DealDamage { target_code, .. } => Some(*target_code),
                        _ => None,
                    })
                    .collect();
                resolved
                    .iter()
                    .any(|cell| {
                        cell.position == target.position
                            && damage_codes.contains(&cell.feature_code)
                    })
                    .then_some(Command::Cast {
                        skill: def.id,
                        release: me.position,
                        facing: Some(facing),
                    })
            }
        }
    }

    fn pick_move(
        &self,
        view: &TurnView<'_>,
        me: &Character,
        target: &Character,
    ) -> Option<Command> {
        let mut best: Option<Position> = None;
        let mut best_distance = me.position.manhattan_distance(target.position);
        for cell in view.state.board.annotated(CellState::Movable) {
            let distance = cell.manhattan_distance(target.position);
            if distance < best_distance {
                best = Some(cell);
                best_distance = distance;
            }
        }
        best.map(|destination| Command::Move { destination })
    }
}

impl CommandProvider for AiController {
    fn decide(&mut self, view: &TurnView<'_>) -> Command {
        let Some(me) = view.state.entities.unit(view.unit) else {
            return Command::EndTurn;
        };
        let Some(target) = view
            .state
            .entities
            .on_team(me.team.opposing())
            .filter(|unit| unit.is_alive())
            .min_by_key(|unit| (me.position.manhattan_distance(unit.position), unit.id))
        else {
            return Command::EndTurn;
        };

        for skill_id in &me.skills {
            let Some(def) = view.skills.skill(*skill_id) else {
                continue;
            };
            if let Some(command) = self.try_cast(view, me, target, def) {
                return command;
            }
        }
        if let Some(command) = self.pick_move(view, me, target) {
            return command;
        }
        Command::EndTurn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{GridMap, Team};

    struct Catalog(Vec<SkillDef>);

    impl SkillOracle for Catalog {
        fn skill(&self, id: SkillId) -> Option<&SkillDef> {
            self.0.iter().find(|def| def.id == id)
        }
    }

    fn melee() -> SkillDef {
        SkillDef {
            id: SkillId(1),
            name: "melee".into(),
            release: ReleaseKind::TargetUnit { range: 1 },
            pattern: skirmish_core::AreaPattern::new([skirmish_core::PatternCell::new((0, 0), 1)]),
            uses_dice: false,
            steps: vec![Step::DealDamage {
                damage_type: skirmish_core::DamageType::Normal,
                fixed_amount: 0.0,
                attack_multiplier: 1.0,
                team_filter: skirmish_core::TeamFilter::Enemies,
                target_code: 1,
            }],
        }
    }

    #[test]
    fn ai_closes_distance_then_attacks() {
        let map = GridMap::new(8, 8);
        let skills = Catalog(vec![melee()]);
        let mut state = GameState::default();
        state
            .spawn(
                Character::new(EntityId(1), Team::Player, Position::ORIGIN)
                    .with_skills([SkillId(1)]),
                Position::new(0, 0),
            )
            .unwrap();
        state
            .spawn(
                Character::new(EntityId(2), Team::Enemy, Position::ORIGIN),
                Position::new(4, 0),
            )
            .unwrap();

        let mut ai = AiController::new();
        // Out of reach with nothing annotated: nothing to do but pass.
        let view = TurnView {
            state: &state,
            map: &map,
            skills: &skills,
            unit: EntityId(1),
        };
        assert_eq!(ai.decide(&view), Command::EndTurn);

        // With movement range annotated the AI walks toward the enemy.
        let mut events = skirmish_core::EventQueue::new();
        state
            .board
            .annotate(Position::new(1, 0), CellState::Movable, &mut events);
        state
            .board
            .annotate(Position::new(0, 1), CellState::Movable, &mut events);
        let view = TurnView {
            state: &state,
            map: &map,
            skills: &skills,
            unit: EntityId(1),
        };
        assert_eq!(
            ai.decide(&view),
            Command::Move {
                destination: Position::new(1, 0)
            }
        );
    }

    #[test]
    fn ai_prefers_casting_when_in_reach() {
        let map = GridMap::new(8, 8);
        let skills = Catalog(vec![melee()]);
        let mut state = GameState::default();
        state
            .spawn(
                Character::new(EntityId(1), Team::Player, Position::ORIGIN)
                    .with_skills([SkillId(1)]),
                Position::new(0, 0),
            )
            .unwrap();
        state
            .spawn(
                Character::new(EntityId(2), Team::Enemy, Position::ORIGIN),
                Position::new(1, 0),
            )
            .unwrap();

        let mut ai = AiController::new();
        let view = TurnView {
            state: &state,
            map: &map,
            skills: &skills,
            unit: EntityId(1),
        };
        assert_eq!(
            ai.decide(&view),
            Command::Cast {
                skill: SkillId(1),
                release: Position::new(1, 0),
                facing: None,
            }
        );
    }
}
