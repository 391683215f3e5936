//! Runtime errors.

use skirmish_core::{BoardError, EntityId, Position, SkillId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no skill {0} in the catalog")]
    UnknownSkill(SkillId),
    #[error("unit {0} does not have {1} equipped")]
    SkillNotEquipped(EntityId, SkillId),
    #[error("release cell {0} is not a valid target")]
    InvalidRelease(Position),
    #[error("destination {0} is outside the movement range")]
    InvalidDestination(Position),
    #[error("it is not unit {0}'s turn")]
    NotCurrentUnit(EntityId),
    #[error("the session is busy with an in-flight activity")]
    Busy,
    #[error("the match is already decided")]
    MatchOver,
    #[error("no free spawn cell near {0}")]
    NoSpawnCell(Position),
    #[error(transparent)]
    Board(#[from] BoardError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
