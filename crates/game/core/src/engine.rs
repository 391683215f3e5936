//! Turn sequencing over the game state.
//!
//! [`TurnEngine`] borrows the canonical [`GameState`] plus the static map
//! oracle and drives the round-robin turn queue: entering a turn annotates
//! the active unit's movement range, ending a turn advances the cursor and
//! immediately enters the next one, removing a defeated unit compacts the
//! queue and evaluates the match outcome. The engine owns no state of its
//! own; drop it and rebuild it around the same `GameState` at will.

use crate::events::{Event, EventQueue};
use crate::search;
use crate::state::{
    CellState, EntityId, GameState, MapOracle, MatchPhase, Team, TurnState, UnitState,
};

pub struct TurnEngine<'a> {
    state: &'a mut GameState,
    map: &'a dyn MapOracle,
}

impl<'a> TurnEngine<'a> {
    pub fn new(state: &'a mut GameState, map: &'a dyn MapOracle) -> Self {
        Self { state, map }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// The unit whose turn it is, if the match has one.
    pub fn current_unit(&self) -> Option<EntityId> {
        self.state.turn.current()
    }

    /// Builds the turn queue from the live units in id order and enters the
    /// first turn.
    pub fn start_match(&mut self, events: &mut EventQueue) {
        self.state.turn = TurnState::new(self.state.entities.iter().map(|unit| unit.id));
        self.state.turn.round = 1;
        self.start_turn(events);
    }

    /// Enters the current unit's turn: marks it `Waiting` and annotates its
    /// reachable cells `Movable`. No-op once the match is over or the queue
    /// is empty.
    pub fn start_turn(&mut self, events: &mut EventQueue) {
        if self.state.turn.phase.is_over() {
            return;
        }
        let Some(id) = self.state.turn.current() else {
            return;
        };
        let Some(unit) = self.state.entities.unit_mut(id) else {
            return;
        };
        unit.state = UnitState::Waiting;
        let origin = unit.position;
        let budget = unit.movement_range;

        self.state
            .board
            .clear_annotations(CellState::Movable, events);
        let range = search::reachable(self.map, &self.state.board, origin, id, budget);
        for cell in range {
            self.state.board.annotate(cell, CellState::Movable, events);
        }
    }

    /// Ends the current unit's turn and enters the next one. Wrapping past
    /// the end of the queue starts a new round.
    pub fn end_turn(&mut self, events: &mut EventQueue) {
        if self.state.turn.phase.is_over() {
            return;
        }
        let Some(id) = self.state.turn.current() else {
            return;
        };
        if let Some(unit) = self.state.entities.unit_mut(id) {
            unit.state = UnitState::Idle;
        }
        self.state
            .board
            .clear_annotations(CellState::Movable, events);

        self.state.turn.cursor = (self.state.turn.cursor + 1) % self.state.turn.queue.len();
        if self.state.turn.cursor == 0 {
            self.state.turn.round += 1;
        }
        self.start_turn(events);
    }

    /// Removes a defeated unit from the queue and the world, then evaluates
    /// whether the match is decided.
    ///
    /// Cursor bookkeeping keeps the turn order stable: removing a unit
    /// before the cursor shifts the cursor back one, removing the unit at
    /// the cursor leaves it pointing at the next unit in order, and a cursor
    /// that falls off the end wraps to the front.
    pub fn remove_unit(&mut self, id: EntityId, events: &mut EventQueue) {
        if let Some(index) = self.state.turn.queue.iter().position(|queued| *queued == id) {
            self.state.turn.queue.remove(index);
            if index < self.state.turn.cursor {
                self.state.turn.cursor -= 1;
            }
            if self.state.turn.cursor >= self.state.turn.queue.len() {
                self.state.turn.cursor = 0;
            }
        }
        self.state.despawn(id);
        self.evaluate_outcome(events);
    }

    /// Decides the match when one side has no live units left. Emits
    /// [`Event::MatchEnded`] at most once per match.
    fn evaluate_outcome(&mut self, events: &mut EventQueue) {
        if self.state.turn.phase.is_over() {
            return;
        }
        let players_alive = self.state.entities.on_team(Team::Player).count() > 0;
        let enemies_alive = self.state.entities.on_team(Team::Enemy).count() > 0;
        let phase = match (players_alive, enemies_alive) {
            (_, false) => MatchPhase::Victory,
            (false, true) => MatchPhase::Defeat,
            (true, true) => return,
        };
        self.state.turn.phase = phase;
        events.push(Event::MatchEnded { phase });
    }
}
