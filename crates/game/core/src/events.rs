//! Fire-and-forget notifications for the presentation layer.
//!
//! The core never blocks on a consumer: events accumulate in an
//! [`EventQueue`] and the host drains them after each tick. Degraded no-ops
//! (missing displacement target, empty pipeline) surface here too, so the
//! host can log them without the core taking a logging dependency.

use crate::combat::DamageType;
use crate::skill::AnimationTrigger;
use crate::state::{CellState, EntityId, MatchPhase, Position};

/// Why a pipeline step degraded to a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum SkipReason {
    /// No resolved cell matched the displacement priority codes.
    NoDisplacementTarget,
    /// The skill was configured with an empty step list.
    EmptyPipeline,
    /// The resolved area contained no cell inside the map.
    EmptyArea,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// A cell annotation changed (movement range, targeting highlights).
    CellStateChanged { position: Position, state: CellState },
    /// A unit moved or is moving; `progress` is 0.0..=1.0 along `from -> to`.
    UnitMoved {
        id: EntityId,
        from: Position,
        to: Position,
        progress: f32,
    },
    /// A pipeline step fired a presentation trigger.
    AnimationTriggered { id: EntityId, trigger: AnimationTrigger },
    /// Damage landed on a unit after resistance.
    DamageDealt {
        id: EntityId,
        amount: i32,
        damage_type: DamageType,
    },
    /// A unit reached zero health. The turn controller removes it.
    UnitDefeated { id: EntityId },
    /// The match reached a terminal phase. Fired exactly once.
    MatchEnded { phase: MatchPhase },
    /// A step degraded to a no-op; informational, never fatal.
    StepSkipped { caster: EntityId, reason: SkipReason },
}

/// Ordered event buffer drained by the host each tick.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}
