//! Targeting overlays for interactive hosts.
//!
//! While a skill is being aimed, the movement-range highlight gives way to
//! the skill's release range and area preview. A [`Targeting`] value owns
//! the swap: beginning it caches and clears the `Movable` cells, cancelling
//! restores them, confirming hands the chosen release back to the caller
//! with the board left clean.

use skirmish_core::{
    CellState, Character, EntityId, EventQueue, Facing, GameState, MapDimensions, MapOracle,
    Position, ReleaseKind, SkillDef, UnitState, area,
};

/// Cells where a skill with this release rule may be released.
pub fn release_candidates(
    map: &dyn MapOracle,
    state: &GameState,
    caster: &Character,
    release: &ReleaseKind,
) -> Vec<Position> {
    match release {
        ReleaseKind::SelfCentered => vec![caster.position],
        ReleaseKind::FreeSelection { range } => {
            cells_in_range(map.dimensions(), caster.position, *range).collect()
        }
        ReleaseKind::TargetUnit { range } => {
            cells_in_range(map.dimensions(), caster.position, *range)
                .filter(|cell| {
                    state
                        .board
                        .occupant(*cell)
                        .is_some_and(|occupant| occupant != caster.id)
                })
                .collect()
        }
    }
}

fn cells_in_range(
    dimensions: MapDimensions,
    center: Position,
    range: u32,
) -> impl Iterator<Item = Position> {
    let range = range as i32;
    (-range..=range)
        .flat_map(move |dy| {
            let width = range - dy.abs();
            (-width..=width).map(move |dx| center.offset_by(dx, dy))
        })
        .filter(move |cell| dimensions.contains(*cell))
}

/// One in-progress aiming interaction.
pub struct Targeting {
    caster: EntityId,
    saved_movable: Vec<Position>,
}

impl Targeting {
    /// Swaps the movement highlight for the skill's release range and puts
    /// the caster into skill selection.
    pub fn begin(
        map: &dyn MapOracle,
        state: &mut GameState,
        caster: &Character,
        skill: &SkillDef,
        events: &mut EventQueue,
    ) -> Self {
        let candidates = release_candidates(map, state, caster, &skill.release);
        let saved_movable = state.board.clear_annotations(CellState::Movable, events);
        for cell in candidates {
            state.board.annotate(cell, CellState::SkillRange, events);
        }
        let caster = caster.id;
        if let Some(unit) = state.entities.unit_mut(caster) {
            unit.state = UnitState::SelectingSkill;
        }
        Self {
            caster,
            saved_movable,
        }
    }

    /// Paints the area the skill would cover if released at `release`,
    /// replacing any previous preview.
    pub fn preview(
        &mut self,
        map: &dyn MapOracle,
        state: &mut GameState,
        skill: &SkillDef,
        release: Position,
        facing: Option<Facing>,
        events: &mut EventQueue,
    ) {
        state.board.clear_annotations(CellState::SkillArea, events);
        for cell in area::resolve(map, release, &skill.pattern, facing) {
            state
                .board
                .annotate(cell.position, CellState::SkillArea, events);
        }
    }

    /// Clears the overlays and restores the movement highlight; the caster
    /// goes back to waiting for a command.
    pub fn cancel(self, state: &mut GameState, events: &mut EventQueue) {
        state.board.clear_annotations(CellState::SkillArea, events);
        state.board.clear_annotations(CellState::SkillRange, events);
        for cell in self.saved_movable {
            state.board.annotate(cell, CellState::Movable, events);
        }
        if let Some(unit) = state.entities.unit_mut(self.caster) {
            unit.state = UnitState::Waiting;
        }
    }

    /// Clears the overlays without restoring the movement highlight; the
    /// caller dispatches the cast next, which spends the turn anyway.
    pub fn confirm(self, state: &mut GameState, events: &mut EventQueue) {
        state.board.clear_annotations(CellState::SkillArea, events);
        state.board.clear_annotations(CellState::SkillRange, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{
        AreaPattern, EntityId, GridMap, PatternCell, SkillId, Team,
    };

    fn fixture() -> (GridMap, GameState, SkillDef) {
        let map = GridMap::new(6, 6);
        let mut state = GameState::default();
        state
            .spawn(
                Character::new(EntityId(1), Team::Player, Position::ORIGIN),
                Position::new(2, 2),
            )
            .unwrap();
        state
            .spawn(
                Character::new(EntityId(2), Team::Enemy, Position::ORIGIN),
                Position::new(3, 2),
            )
            .unwrap();
        let skill = SkillDef {
            id: SkillId(1),
            name: "zap".into(),
            release: ReleaseKind::FreeSelection { range: 2 },
            pattern: AreaPattern::new([
                PatternCell::new((0, 0), 1),
                PatternCell::new((0, 1), 1),
            ]),
            uses_dice: false,
            steps: vec![],
        };
        (map, state, skill)
    }

    #[test]
    fn free_selection_candidates_form_a_clipped_diamond() {
        let (map, state, skill) = fixture();
        let caster = state.entities.unit(EntityId(1)).unwrap();
        let candidates = release_candidates(&map, &state, caster, &skill.release);
        // Full diamond of radius 2 fits the 6x6 map: 13 cells.
        assert_eq!(candidates.len(), 13);
        assert!(candidates.contains(&Position::new(2, 2)));
        assert!(candidates.contains(&Position::new(2, 4)));
        assert!(!candidates.contains(&Position::new(2, 5)));
    }

    #[test]
    fn target_unit_candidates_require_an_occupant() {
        let (map, state, _) = fixture();
        let caster = state.entities.unit(EntityId(1)).unwrap();
        let candidates =
            release_candidates(&map, &state, caster, &ReleaseKind::TargetUnit { range: 2 });
        // Only the enemy cell qualifies; the caster's own cell never does.
        assert_eq!(candidates, vec![Position::new(3, 2)]);
    }

    #[test]
    fn cancel_restores_the_movement_highlight() {
        let (map, mut state, skill) = fixture();
        let mut events = EventQueue::new();
        state
            .board
            .annotate(Position::new(2, 3), CellState::Movable, &mut events);

        let caster = state.entities.unit(EntityId(1)).unwrap().clone();
        let mut targeting = Targeting::begin(&map, &mut state, &caster, &skill, &mut events);
        assert_eq!(state.board.annotation(Position::new(2, 3)), CellState::SkillRange);

        targeting.preview(
            &map,
            &mut state,
            &skill,
            Position::new(2, 3),
            None,
            &mut events,
        );
        assert_eq!(state.board.annotation(Position::new(2, 4)), CellState::SkillArea);

        targeting.cancel(&mut state, &mut events);
        assert_eq!(state.board.annotation(Position::new(2, 3)), CellState::Movable);
        assert_eq!(state.board.annotation(Position::new(2, 4)), CellState::Default);
        assert_eq!(state.board.annotated(CellState::SkillRange).count(), 0);
    }
}
