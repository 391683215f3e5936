//! Tick-driven execution of a skill's step script.
//!
//! A [`PipelineRun`] is the explicit state machine for one in-flight cast:
//! a step cursor plus the suspension state of the current step. The host
//! calls [`PipelineRun::tick`] with its frame delta; the run advances
//! through instantaneous steps immediately and parks on suspensions (waits,
//! displacement interpolation). Step N+1 never starts before step N's
//! suspension has fully resolved.
//!
//! Once constructed a run always executes to completion; cancelling
//! targeting in the host must not (and cannot) cancel a dispatched run.

use std::collections::BTreeSet;

use crate::area::ResolvedCell;
use crate::combat;
use crate::events::{Event, EventQueue, SkipReason};
use crate::state::{EntityId, GameState, Position};

use super::{EasingCurve, SkillDef, Step};

/// Whether a run still needs ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStatus {
    Running,
    Complete,
}

/// Suspension state of the current step.
#[derive(Clone, Debug, PartialEq)]
enum StepProgress {
    /// The current step has not started yet.
    Ready,
    Waiting {
        remaining: f32,
    },
    Displacing {
        from: Position,
        to: Position,
        elapsed: f32,
        total: f32,
        curve: EasingCurve,
    },
}

/// One in-flight skill cast.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    caster: EntityId,
    targets: Vec<ResolvedCell>,
    steps: Vec<Step>,
    multiplier: f32,
    cursor: usize,
    progress: StepProgress,
}

impl PipelineRun {
    /// Dispatches a cast. `multiplier` is the dice-derived power scale
    /// (1.0 when the skill does not roll).
    ///
    /// Configuration problems (empty step list, area resolved to nothing)
    /// are reported as [`Event::StepSkipped`] and the run completes on its
    /// first tick without effect.
    pub fn new(
        caster: EntityId,
        def: &SkillDef,
        targets: Vec<ResolvedCell>,
        multiplier: f32,
        events: &mut EventQueue,
    ) -> Self {
        if def.steps.is_empty() {
            events.push(Event::StepSkipped {
                caster,
                reason: SkipReason::EmptyPipeline,
            });
        } else if targets.is_empty() {
            events.push(Event::StepSkipped {
                caster,
                reason: SkipReason::EmptyArea,
            });
        }
        let steps = if def.steps.is_empty() || targets.is_empty() {
            Vec::new()
        } else {
            def.steps.clone()
        };
        Self {
            caster,
            targets,
            steps,
            multiplier,
            cursor: 0,
            progress: StepProgress::Ready,
        }
    }

    pub fn caster(&self) -> EntityId {
        self.caster
    }

    /// Advances the run by `dt` seconds. Leftover time after a suspension
    /// resolves flows into the following steps within the same call.
    pub fn tick(
        &mut self,
        dt: f32,
        state: &mut GameState,
        events: &mut EventQueue,
    ) -> PipelineStatus {
        let mut budget = dt;
        loop {
            if self.cursor >= self.steps.len() {
                return PipelineStatus::Complete;
            }

            match std::mem::replace(&mut self.progress, StepProgress::Ready) {
                StepProgress::Ready => {
                    if !self.start_step(state, events) {
                        // Suspended; spend the budget on the new suspension.
                        continue;
                    }
                    self.cursor += 1;
                }
                StepProgress::Waiting { remaining } => {
                    if budget < remaining {
                        self.progress = StepProgress::Waiting {
                            remaining: remaining - budget,
                        };
                        return PipelineStatus::Running;
                    }
                    budget -= remaining;
                    self.cursor += 1;
                }
                StepProgress::Displacing {
                    from,
                    to,
                    elapsed,
                    total,
                    curve,
                } => {
                    let elapsed = elapsed + budget;
                    if elapsed < total {
                        events.push(Event::UnitMoved {
                            id: self.caster,
                            from,
                            to,
                            progress: curve.evaluate(elapsed / total),
                        });
                        self.progress = StepProgress::Displacing {
                            from,
                            to,
                            elapsed,
                            total,
                            curve,
                        };
                        return PipelineStatus::Running;
                    }
                    budget = elapsed - total;
                    let _ = state.move_unit(self.caster, to);
                    events.push(Event::UnitMoved {
                        id: self.caster,
                        from,
                        to,
                        progress: 1.0,
                    });
                    self.cursor += 1;
                }
            }
        }
    }

    /// Begins the step under the cursor. Returns true when the step finished
    /// instantly, false when it suspended into `self.progress`.
    fn start_step(&mut self, state: &mut GameState, events: &mut EventQueue) -> bool {
        match self.steps[self.cursor].clone() {
            Step::Wait { duration } => {
                if duration <= 0.0 {
                    return true;
                }
                self.progress = StepProgress::Waiting {
                    remaining: duration,
                };
                false
            }
            Step::PlayAnimation { trigger } => {
                events.push(Event::AnimationTriggered {
                    id: self.caster,
                    trigger,
                });
                true
            }
            Step::Displace {
                priority_codes,
                speed,
                curve,
            } => self.start_displacement(&priority_codes, speed, curve, state, events),
            Step::DealDamage {
                damage_type,
                fixed_amount,
                attack_multiplier,
                team_filter,
                target_code,
            } => {
                let (caster_team, caster_attack) = match state.entities.unit(self.caster) {
                    Some(unit) => (unit.team, unit.attack),
                    None => return true,
                };
                let total =
                    (fixed_amount + attack_multiplier * caster_attack as f32) * self.multiplier;

                // Each distinct occupant is damaged at most once per step,
                // even when several pattern cells cover it.
                let mut damaged: BTreeSet<EntityId> = BTreeSet::new();
                for target in &self.targets {
                    if target.feature_code != target_code {
                        continue;
                    }
                    let Some(occupant) = state.board.occupant(target.position) else {
                        continue;
                    };
                    if !damaged.insert(occupant) {
                        continue;
                    }
                    let Some(unit) = state.entities.unit_mut(occupant) else {
                        continue;
                    };
                    if !team_filter.permits(caster_team, unit.team) {
                        continue;
                    }
                    let amount = combat::apply_damage(unit, total, damage_type);
                    events.push(Event::DamageDealt {
                        id: occupant,
                        amount,
                        damage_type,
                    });
                    if !unit.is_alive() {
                        events.push(Event::UnitDefeated { id: occupant });
                    }
                }
                true
            }
        }
    }

    fn start_displacement(
        &mut self,
        priority_codes: &[i32],
        speed: f32,
        curve: EasingCurve,
        state: &mut GameState,
        events: &mut EventQueue,
    ) -> bool {
        let destination = priority_codes.iter().find_map(|code| {
            self.targets.iter().find_map(|target| {
                (target.feature_code == *code && !state.board.is_occupied(target.position))
                    .then_some(target.position)
            })
        });
        let Some(to) = destination else {
            events.push(Event::StepSkipped {
                caster: self.caster,
                reason: SkipReason::NoDisplacementTarget,
            });
            return true;
        };
        let Some(from) = state.entities.unit(self.caster).map(|unit| unit.position) else {
            return true;
        };
        let total = if speed > 0.0 {
            from.euclidean_distance(to) / speed
        } else {
            0.0
        };
        if total <= 0.0 {
            let _ = state.move_unit(self.caster, to);
            events.push(Event::UnitMoved {
                id: self.caster,
                from,
                to,
                progress: 1.0,
            });
            return true;
        }
        self.progress = StepProgress::Displacing {
            from,
            to,
            elapsed: 0.0,
            total,
            curve,
        };
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{AreaPattern, PatternCell, ResolvedCell};
    use crate::combat::DamageType;
    use crate::skill::{AnimationTrigger, ReleaseKind, SkillId, TeamFilter};
    use crate::state::{Character, Resistances, Team};

    fn skill(steps: Vec<Step>) -> SkillDef {
        SkillDef {
            id: SkillId(1),
            name: "test".into(),
            release: ReleaseKind::SelfCentered,
            pattern: AreaPattern::new([PatternCell::new((0, 1), 1)]),
            uses_dice: false,
            steps,
        }
    }

    fn resolved(position: Position, feature_code: i32) -> ResolvedCell {
        ResolvedCell {
            position,
            feature_code,
            color: Default::default(),
        }
    }

    fn state_with_units() -> GameState {
        let mut state = GameState::default();
        state
            .spawn(
                Character::new(EntityId(1), Team::Player, Position::ORIGIN).with_attack(10),
                Position::ORIGIN,
            )
            .unwrap();
        state
            .spawn(
                Character::new(EntityId(2), Team::Enemy, Position::new(0, 1))
                    .with_health(50)
                    .with_resistances(Resistances::new().with(DamageType::Fire, 0.2)),
                Position::new(0, 1),
            )
            .unwrap();
        state
    }

    #[test]
    fn empty_step_list_degrades_to_noop() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![]);
        let mut run = PipelineRun::new(
            EntityId(1),
            &def,
            vec![resolved(Position::new(0, 1), 1)],
            1.0,
            &mut events,
        );
        assert!(matches!(
            events.iter().next(),
            Some(Event::StepSkipped {
                reason: SkipReason::EmptyPipeline,
                ..
            })
        ));
        assert_eq!(
            run.tick(0.1, &mut state, &mut events),
            PipelineStatus::Complete
        );
    }

    #[test]
    fn wait_suspends_until_duration_elapses() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![
            Step::Wait { duration: 0.5 },
            Step::PlayAnimation {
                trigger: AnimationTrigger(3),
            },
        ]);
        let mut run = PipelineRun::new(
            EntityId(1),
            &def,
            vec![resolved(Position::new(0, 1), 1)],
            1.0,
            &mut events,
        );

        // Two ticks inside the wait: the animation must not have fired.
        assert_eq!(
            run.tick(0.2, &mut state, &mut events),
            PipelineStatus::Running
        );
        assert_eq!(
            run.tick(0.2, &mut state, &mut events),
            PipelineStatus::Running
        );
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, Event::AnimationTriggered { .. }))
        );

        // Crossing the boundary releases the wait and runs the next step in
        // the same tick (leftover time carries over).
        assert_eq!(
            run.tick(0.2, &mut state, &mut events),
            PipelineStatus::Complete
        );
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::AnimationTriggered { .. }))
        );
    }

    #[test]
    fn damage_step_filters_teams_and_hits_once() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![Step::DealDamage {
            damage_type: DamageType::Fire,
            fixed_amount: 10.0,
            attack_multiplier: 0.0,
            team_filter: TeamFilter::Enemies,
            target_code: 1,
        }]);
        // Two resolved cells, but only one covers the enemy; the caster's own
        // cell carries a matching code and must be ignored by the filter.
        let targets = vec![
            resolved(Position::new(0, 1), 1),
            resolved(Position::new(0, 1), 1),
            resolved(Position::ORIGIN, 1),
        ];
        let mut run = PipelineRun::new(EntityId(1), &def, targets, 1.0, &mut events);
        assert_eq!(
            run.tick(0.016, &mut state, &mut events),
            PipelineStatus::Complete
        );

        // round(10 * 0.8) = 8, applied exactly once.
        let hits: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, Event::DamageDealt { .. }))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(state.entities.unit(EntityId(2)).unwrap().current_health, 42);
        assert_eq!(state.entities.unit(EntityId(1)).unwrap().current_health, 100);
    }

    #[test]
    fn damage_uses_attack_and_dice_multiplier() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![Step::DealDamage {
            damage_type: DamageType::Normal,
            fixed_amount: 5.0,
            attack_multiplier: 1.0,
            team_filter: TeamFilter::Enemies,
            target_code: 1,
        }]);
        let targets = vec![resolved(Position::new(0, 1), 1)];
        // (5 + 1.0 * 10) * 1.5 = 22.5 -> rounds to 23.
        let mut run = PipelineRun::new(EntityId(1), &def, targets, 1.5, &mut events);
        run.tick(0.016, &mut state, &mut events);
        assert_eq!(state.entities.unit(EntityId(2)).unwrap().current_health, 27);
    }

    #[test]
    fn lethal_damage_reports_defeat() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![Step::DealDamage {
            damage_type: DamageType::Normal,
            fixed_amount: 500.0,
            attack_multiplier: 0.0,
            team_filter: TeamFilter::Enemies,
            target_code: 1,
        }]);
        let mut run = PipelineRun::new(
            EntityId(1),
            &def,
            vec![resolved(Position::new(0, 1), 1)],
            1.0,
            &mut events,
        );
        run.tick(0.016, &mut state, &mut events);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::UnitDefeated { id: EntityId(2) }))
        );
        assert_eq!(state.entities.unit(EntityId(2)).unwrap().current_health, 0);
    }

    #[test]
    fn displacement_picks_first_open_cell_by_priority() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![Step::Displace {
            priority_codes: vec![9, 8],
            speed: 10.0,
            curve: EasingCurve::Linear,
        }]);
        // Code 9 cell is occupied by the enemy, so code 8 wins.
        let targets = vec![
            resolved(Position::new(0, 1), 9),
            resolved(Position::new(1, 0), 8),
        ];
        let mut run = PipelineRun::new(EntityId(1), &def, targets, 1.0, &mut events);

        let mut status = PipelineStatus::Running;
        let mut guard = 0;
        while status == PipelineStatus::Running {
            status = run.tick(0.05, &mut state, &mut events);
            guard += 1;
            assert!(guard < 100, "displacement never completed");
        }
        assert_eq!(
            state.entities.unit(EntityId(1)).unwrap().position,
            Position::new(1, 0)
        );
        assert_eq!(state.board.occupant(Position::new(1, 0)), Some(EntityId(1)));
    }

    #[test]
    fn displacement_without_target_skips() {
        let mut state = state_with_units();
        let mut events = EventQueue::new();
        let def = skill(vec![Step::Displace {
            priority_codes: vec![9],
            speed: 10.0,
            curve: EasingCurve::Linear,
        }]);
        // Only candidate cell is occupied.
        let targets = vec![resolved(Position::new(0, 1), 9)];
        let mut run = PipelineRun::new(EntityId(1), &def, targets, 1.0, &mut events);
        assert_eq!(
            run.tick(0.016, &mut state, &mut events),
            PipelineStatus::Complete
        );
        assert!(events.iter().any(|e| matches!(
            e,
            Event::StepSkipped {
                reason: SkipReason::NoDisplacementTarget,
                ..
            }
        )));
        assert_eq!(
            state.entities.unit(EntityId(1)).unwrap().position,
            Position::ORIGIN
        );
    }
}
