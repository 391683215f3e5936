//! Skill definitions: where a skill may be released, which cells it covers
//! and the ordered step script it runs.
//!
//! Steps are a closed enum dispatched by pattern match. The step vocabulary
//! (wait, animate, displace, damage) is small and fixed; new step kinds are
//! added here, not registered at runtime.

mod pipeline;

pub use pipeline::{PipelineRun, PipelineStatus};

use std::fmt;

use crate::area::AreaPattern;
use crate::combat::DamageType;
use crate::state::Team;

/// Identifier for a configured skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u16);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skill:{}", self.0)
    }
}

/// Presentation trigger fired by [`Step::PlayAnimation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationTrigger(pub u16);

/// Where the release cell for a skill may be chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReleaseKind {
    /// Released on the caster's own cell; the pattern rotates to the
    /// caster's facing.
    SelfCentered,
    /// Any cell within Manhattan `range` of the caster.
    FreeSelection { range: u32 },
    /// A cell occupied by some unit, within Manhattan `range`.
    TargetUnit { range: u32 },
}

/// Which occupants a damage step affects, relative to the caster's team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeamFilter {
    Enemies,
    Allies,
    All,
}

impl TeamFilter {
    pub fn permits(self, caster: Team, target: Team) -> bool {
        match self {
            TeamFilter::Enemies => caster != target,
            TeamFilter::Allies => caster == target,
            TeamFilter::All => true,
        }
    }
}

/// Interpolation shape for displacement movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EasingCurve {
    Linear,
    SmoothStep,
}

impl EasingCurve {
    /// Evaluates the curve at `t` in 0.0..=1.0.
    pub fn evaluate(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingCurve::Linear => t,
            EasingCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        EasingCurve::Linear
    }
}

/// One unit of effect in a skill's script. Steps run strictly in order; a
/// step starts only after the previous step's suspension has resolved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// Suspends the pipeline for `duration` seconds. No side effect.
    Wait { duration: f32 },
    /// Fires a presentation trigger. Non-blocking; does not suspend.
    PlayAnimation { trigger: AnimationTrigger },
    /// Moves the caster to the first unoccupied resolved cell whose feature
    /// code matches, in priority order. No match degrades to a no-op.
    Displace {
        priority_codes: Vec<i32>,
        /// Cells per second.
        speed: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        curve: EasingCurve,
    },
    /// Damages every matching occupant once, after team filtering.
    DealDamage {
        damage_type: DamageType,
        fixed_amount: f32,
        attack_multiplier: f32,
        team_filter: TeamFilter,
        target_code: i32,
    },
}

/// A configured skill: release rule, area pattern and step script.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    pub release: ReleaseKind,
    pub pattern: AreaPattern,
    /// Whether the cast rolls dice to scale damage steps.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uses_dice: bool,
    pub steps: Vec<Step>,
}

/// Static skill definitions supplied by the content layer at startup.
pub trait SkillOracle {
    fn skill(&self, id: SkillId) -> Option<&SkillDef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_filter_semantics() {
        assert!(TeamFilter::Enemies.permits(Team::Player, Team::Enemy));
        assert!(!TeamFilter::Enemies.permits(Team::Player, Team::Player));
        assert!(TeamFilter::Allies.permits(Team::Enemy, Team::Enemy));
        assert!(!TeamFilter::Allies.permits(Team::Enemy, Team::Player));
        assert!(TeamFilter::All.permits(Team::Player, Team::Player));
        assert!(TeamFilter::All.permits(Team::Player, Team::Enemy));
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        for curve in [EasingCurve::Linear, EasingCurve::SmoothStep] {
            assert_eq!(curve.evaluate(0.0), 0.0);
            assert_eq!(curve.evaluate(1.0), 1.0);
            // Clamped outside the unit interval.
            assert_eq!(curve.evaluate(-1.0), 0.0);
            assert_eq!(curve.evaluate(2.0), 1.0);
        }
        assert!(EasingCurve::SmoothStep.evaluate(0.25) < 0.25);
        assert!(EasingCurve::SmoothStep.evaluate(0.75) > 0.75);
    }
}
