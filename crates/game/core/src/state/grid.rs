//! Static map layout and the dynamic board layered on top of it.
//!
//! The static side (passability, bounds) is behind [`MapOracle`] so hosts can
//! supply layouts from data files or build them in tests. The dynamic side
//! lives in [`BoardState`]: cell occupancy and presentation annotations.
//!
//! Occupancy is the canonical record of who stands where. A unit's own
//! `position` field is a cached lookup key; every mutation flows through the
//! mutators here so the two sides can never be updated independently.

use std::collections::{BTreeMap, BTreeSet};

use crate::events::{Event, EventQueue};

use super::{CellState, EntityId, Position};

/// Static map oracle exposing immutable layout information.
pub trait MapOracle {
    fn dimensions(&self) -> MapDimensions;

    /// Whether the cell can ever be entered. Out-of-bounds cells are not
    /// passable.
    fn is_passable(&self, position: Position) -> bool;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

/// Concrete map: a rectangle of passable cells with a blocked-cell set.
#[derive(Clone, Debug, Default)]
pub struct GridMap {
    dimensions: MapDimensions,
    blocked: BTreeSet<Position>,
}

impl GridMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: MapDimensions::new(width, height),
            blocked: BTreeSet::new(),
        }
    }

    pub fn with_blocked(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.blocked.extend(cells);
        self
    }

    pub fn block(&mut self, position: Position) {
        self.blocked.insert(position);
    }
}

impl Default for MapDimensions {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl MapOracle for GridMap {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn is_passable(&self, position: Position) -> bool {
        self.dimensions.contains(position) && !self.blocked.contains(&position)
    }
}

/// Errors from board occupancy mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("cell {0} is already occupied")]
    CellOccupied(Position),
    #[error("unit {0} does not occupy {1}")]
    NotOccupant(EntityId, Position),
}

/// Dynamic per-cell state: occupancy plus presentation annotations.
///
/// At most one occupant per cell. Annotations are sparse; an absent entry
/// reads as [`CellState::Default`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardState {
    occupancy: BTreeMap<Position, EntityId>,
    annotations: BTreeMap<Position, CellState>,
}

impl BoardState {
    pub fn occupant(&self, position: Position) -> Option<EntityId> {
        self.occupancy.get(&position).copied()
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.occupancy.contains_key(&position)
    }

    pub fn occupancy(&self) -> impl Iterator<Item = (Position, EntityId)> + '_ {
        self.occupancy.iter().map(|(pos, id)| (*pos, *id))
    }

    /// Places a unit on an empty cell.
    pub fn place(&mut self, entity: EntityId, position: Position) -> Result<(), BoardError> {
        if let Some(occupant) = self.occupant(position)
            && occupant != entity
        {
            return Err(BoardError::CellOccupied(position));
        }
        self.occupancy.insert(position, entity);
        Ok(())
    }

    /// Removes a unit from the cell it occupies.
    pub fn remove(&mut self, entity: EntityId, position: Position) -> Result<(), BoardError> {
        match self.occupancy.get(&position) {
            Some(occupant) if *occupant == entity => {
                self.occupancy.remove(&position);
                Ok(())
            }
            _ => Err(BoardError::NotOccupant(entity, position)),
        }
    }

    /// Moves a unit between cells in one step, keeping the one-occupant
    /// invariant intact throughout.
    pub fn relocate(
        &mut self,
        entity: EntityId,
        from: Position,
        to: Position,
    ) -> Result<(), BoardError> {
        if from == to {
            return Ok(());
        }
        if let Some(occupant) = self.occupant(to)
            && occupant != entity
        {
            return Err(BoardError::CellOccupied(to));
        }
        self.remove(entity, from)?;
        self.occupancy.insert(to, entity);
        Ok(())
    }

    /// Current annotation of a cell; `Default` when unset.
    pub fn annotation(&self, position: Position) -> CellState {
        self.annotations
            .get(&position)
            .copied()
            .unwrap_or_default()
    }

    /// Sets a cell annotation, notifying the presentation layer on change.
    pub fn annotate(&mut self, position: Position, state: CellState, events: &mut EventQueue) {
        let previous = self.annotation(position);
        if previous == state {
            return;
        }
        if state == CellState::Default {
            self.annotations.remove(&position);
        } else {
            self.annotations.insert(position, state);
        }
        events.push(Event::CellStateChanged { position, state });
    }

    /// Resets every cell currently annotated `state` back to `Default`.
    /// Returns the cells that were cleared so callers can restore them later.
    pub fn clear_annotations(&mut self, state: CellState, events: &mut EventQueue) -> Vec<Position> {
        let cleared: Vec<Position> = self
            .annotations
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(pos, _)| *pos)
            .collect();
        for position in &cleared {
            self.annotations.remove(position);
            events.push(Event::CellStateChanged {
                position: *position,
                state: CellState::Default,
            });
        }
        cleared
    }

    /// All cells currently carrying the given annotation.
    pub fn annotated(&self, state: CellState) -> impl Iterator<Item = Position> + '_ {
        self.annotations
            .iter()
            .filter(move |(_, s)| **s == state)
            .map(|(pos, _)| *pos)
    }
}
