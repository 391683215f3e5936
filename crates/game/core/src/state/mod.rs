//! Canonical simulation state.
//!
//! [`GameState`] aggregates the dynamic board, the units and the turn queue.
//! The static map stays outside the state, behind [`MapOracle`], so the same
//! state type works against any layout source.

mod common;
mod grid;
mod turn;
mod units;

pub use common::{CellState, EntityId, Facing, Position, Team, UnitState};
pub use grid::{BoardError, BoardState, GridMap, MapDimensions, MapOracle};
pub use turn::{MatchPhase, TurnState};
pub use units::{Character, EntitiesState, Resistances};

/// Aggregate simulation state. Explicitly constructed and passed by
/// reference; there is no ambient global state anywhere in the crate.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub board: BoardState,
    pub entities: EntitiesState,
    pub turn: TurnState,
}

impl GameState {
    /// Places a unit into the world: board occupancy first, then the unit's
    /// cached position. The single entry point for spawning onto a cell.
    pub fn spawn(&mut self, mut unit: Character, position: Position) -> Result<(), BoardError> {
        self.board.place(unit.id, position)?;
        unit.position = position;
        self.entities.insert(unit);
        Ok(())
    }

    /// Moves a unit to a new cell, keeping board occupancy and the unit's
    /// cached position in lockstep. All movement and displacement funnels
    /// through here.
    pub fn move_unit(&mut self, id: EntityId, to: Position) -> Result<(), BoardError> {
        let from = match self.entities.unit(id) {
            Some(unit) => unit.position,
            None => return Ok(()),
        };
        debug_assert_eq!(
            self.board.occupant(from),
            Some(id),
            "board occupancy out of sync with unit {id} cached position",
        );
        // In release builds trust the board record over the cached pointer.
        let from = self
            .board
            .occupancy()
            .find(|(_, occupant)| *occupant == id)
            .map(|(pos, _)| pos)
            .unwrap_or(from);
        self.board.relocate(id, from, to)?;
        if let Some(unit) = self.entities.unit_mut(id) {
            unit.position = to;
        }
        Ok(())
    }

    /// Removes a unit from board and storage. Turn-queue bookkeeping is the
    /// engine's job.
    pub fn despawn(&mut self, id: EntityId) -> Option<Character> {
        let unit = self.entities.remove(id)?;
        let _ = self.board.remove(id, unit.position);
        Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_move_keep_both_sides_in_sync() {
        let mut state = GameState::default();
        let unit = Character::new(EntityId(1), Team::Player, Position::ORIGIN);
        state.spawn(unit, Position::new(2, 2)).unwrap();

        assert_eq!(state.board.occupant(Position::new(2, 2)), Some(EntityId(1)));
        assert_eq!(
            state.entities.unit(EntityId(1)).unwrap().position,
            Position::new(2, 2)
        );

        state.move_unit(EntityId(1), Position::new(2, 3)).unwrap();
        assert!(!state.board.is_occupied(Position::new(2, 2)));
        assert_eq!(state.board.occupant(Position::new(2, 3)), Some(EntityId(1)));
        assert_eq!(
            state.entities.unit(EntityId(1)).unwrap().position,
            Position::new(2, 3)
        );
    }

    #[test]
    fn spawn_refuses_occupied_cell() {
        let mut state = GameState::default();
        let cell = Position::new(1, 1);
        state
            .spawn(Character::new(EntityId(1), Team::Player, cell), cell)
            .unwrap();
        let err = state
            .spawn(Character::new(EntityId(2), Team::Enemy, cell), cell)
            .unwrap_err();
        assert_eq!(err, BoardError::CellOccupied(cell));
    }

    #[test]
    fn despawn_clears_occupancy() {
        let mut state = GameState::default();
        let cell = Position::new(4, 4);
        state
            .spawn(Character::new(EntityId(9), Team::Enemy, cell), cell)
            .unwrap();
        state.despawn(EntityId(9));
        assert!(!state.board.is_occupied(cell));
        assert!(state.entities.unit(EntityId(9)).is_none());
    }
}
