//! Turn ordering state.

use super::EntityId;

/// Terminal outcome of a match, or still running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchPhase {
    Active,
    Victory,
    Defeat,
}

impl MatchPhase {
    pub fn is_over(self) -> bool {
        !matches!(self, MatchPhase::Active)
    }
}

/// Round-robin turn queue over the live units.
///
/// Invariant: `cursor` indexes a live unit, or the queue is empty. The round
/// counter increments each time the cursor wraps back to 0.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    pub queue: Vec<EntityId>,
    pub cursor: usize,
    pub round: u32,
    pub phase: MatchPhase,
}

impl TurnState {
    pub fn new(order: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            queue: order.into_iter().collect(),
            cursor: 0,
            round: 0,
            phase: MatchPhase::Active,
        }
    }

    /// The unit whose turn it currently is, if any.
    pub fn current(&self) -> Option<EntityId> {
        self.queue.get(self.cursor).copied()
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new([])
    }
}
