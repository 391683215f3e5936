//! Match orchestration: one session drives one match to its end.
//!
//! [`MatchSession`] owns the canonical state, the static map, the skill
//! catalog and the dice, and advances everything from a single synchronous
//! [`MatchSession::tick`]. In-flight work (walking a path, running a skill
//! pipeline) lives in an explicit [`Activity`] value; there is exactly one
//! activity at a time, so effect timelines can never interleave.

use tracing::{debug, info, warn};

use skirmish_core::{
    CellState, EasingCurve, EntityId, Event, EventQueue, Facing, GameState, GridMap,
    MatchPhase, PipelineRun, PipelineStatus, Position, ReleaseKind, SkillId, SkillOracle, Team,
    TurnEngine, UnitState, area, combat, search,
};
use skirmish_content::{ScenarioData, SkillRegistry};

use crate::command::{Command, CommandProvider, TurnView};
use crate::error::{Result, SessionError};
use crate::targeting;

/// What the session is currently busy with.
enum Activity {
    Idle,
    /// Walking a path, one leg per cell. `progress` is 0.0..=1.0 within the
    /// current leg.
    Moving {
        unit: EntityId,
        path: Vec<Position>,
        leg: usize,
        progress: f32,
    },
    Casting(PipelineRun),
}

/// One running match: state, content and the per-team command providers.
pub struct MatchSession {
    state: GameState,
    map: GridMap,
    skills: SkillRegistry,
    dice: combat::PcgDice,
    events: EventQueue,
    activity: Activity,
    player_provider: Box<dyn CommandProvider>,
    enemy_provider: Box<dyn CommandProvider>,
}

impl MatchSession {
    /// Builds a session from loaded content and starts the first turn.
    ///
    /// Spawn cells that are blocked or already taken snap to the nearest
    /// free cell instead of failing the whole scenario.
    pub fn new(
        map: GridMap,
        skills: SkillRegistry,
        scenario: &ScenarioData,
        seed: u64,
        player_provider: Box<dyn CommandProvider>,
        enemy_provider: Box<dyn CommandProvider>,
    ) -> Result<Self> {
        let mut state = GameState::default();
        for spec in &scenario.units {
            let (unit, wanted) = spec.build();
            let cell = snap_to_free_cell(&map, &state, wanted)
                .ok_or(SessionError::NoSpawnCell(wanted))?;
            if cell != wanted {
                warn!(unit = %unit.id, %wanted, %cell, "spawn cell taken, snapped");
            }
            state.spawn(unit, cell)?;
        }

        let mut session = Self {
            state,
            map,
            skills,
            dice: combat::PcgDice::new(seed),
            events: EventQueue::new(),
            activity: Activity::Idle,
            player_provider,
            enemy_provider,
        };
        info!(scenario = %scenario.name, units = session.state.entities.len(), "match started");
        TurnEngine::new(&mut session.state, &session.map).start_match(&mut session.events);
        Ok(session)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.turn.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.turn.phase.is_over()
    }

    /// Drains the events accumulated since the last drain. Hosts call this
    /// once per frame after [`tick`](Self::tick). Degraded no-ops surface
    /// as warnings here so misconfigured content is visible in the logs.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let events = self.events.drain();
        for event in &events {
            if let Event::StepSkipped { caster, reason } = event {
                warn!(unit = %caster, %reason, "step skipped");
            }
        }
        events
    }

    /// Advances the match by `dt` seconds.
    ///
    /// When idle, asks the active unit's provider for a command and
    /// dispatches it; an in-flight activity is advanced instead and consumes
    /// the whole tick.
    pub fn tick(&mut self, dt: f32) {
        match std::mem::replace(&mut self.activity, Activity::Idle) {
            Activity::Idle => self.tick_idle(),
            Activity::Moving {
                unit,
                path,
                leg,
                progress,
            } => self.tick_moving(unit, path, leg, progress, dt),
            Activity::Casting(run) => self.tick_casting(run, dt),
        }
    }

    fn tick_idle(&mut self) {
        if self.is_over() {
            return;
        }
        let Some(unit) = self.state.turn.current() else {
            return;
        };
        let team = match self.state.entities.unit(unit) {
            Some(unit) => unit.team,
            None => return,
        };
        let view = TurnView {
            state: &self.state,
            map: &self.map,
            skills: &self.skills,
            unit,
        };
        let command = match team {
            Team::Player => self.player_provider.decide(&view),
            Team::Enemy => self.enemy_provider.decide(&view),
        };
        debug!(%unit, ?command, "command");
        if let Err(error) = self.dispatch(unit, command) {
            // A provider that issues bad commands forfeits the turn rather
            // than wedging the match.
            warn!(%unit, %error, "command rejected, ending turn");
            TurnEngine::new(&mut self.state, &self.map).end_turn(&mut self.events);
        }
    }

    /// Validates and starts a command for `unit`. Public so interactive
    /// hosts can drive a turn directly instead of through a provider.
    pub fn dispatch(&mut self, unit: EntityId, command: Command) -> Result<()> {
        if self.is_over() {
            return Err(SessionError::MatchOver);
        }
        if !matches!(self.activity, Activity::Idle) {
            return Err(SessionError::Busy);
        }
        if self.state.turn.current() != Some(unit) {
            return Err(SessionError::NotCurrentUnit(unit));
        }
        match command {
            Command::Move { destination } => self.start_move(unit, destination),
            Command::Cast {
                skill,
                release,
                facing,
            } => self.start_cast(unit, skill, release, facing),
            Command::EndTurn => {
                TurnEngine::new(&mut self.state, &self.map).end_turn(&mut self.events);
                Ok(())
            }
        }
    }

    fn start_move(&mut self, unit: EntityId, destination: Position) -> Result<()> {
        let origin = match self.state.entities.unit(unit) {
            Some(unit) => unit.position,
            None => return Err(SessionError::NotCurrentUnit(unit)),
        };
        if self.state.board.annotation(destination) != CellState::Movable {
            return Err(SessionError::InvalidDestination(destination));
        }
        let path = search::find_path(&self.map, &self.state.board, origin, destination)
            .ok_or(SessionError::InvalidDestination(destination))?;
        if path.len() < 2 {
            return Ok(());
        }
        // One walk per turn: clearing the range annotation both spends the
        // move and invalidates any stale highlight while the unit drifts.
        self.state
            .board
            .clear_annotations(CellState::Movable, &mut self.events);
        if let Some(unit) = self.state.entities.unit_mut(unit) {
            unit.state = UnitState::Moving;
        }
        self.activity = Activity::Moving {
            unit,
            path,
            leg: 0,
            progress: 0.0,
        };
        Ok(())
    }

    fn start_cast(
        &mut self,
        unit: EntityId,
        skill: SkillId,
        release: Position,
        facing: Option<Facing>,
    ) -> Result<()> {
        let def = self
            .skills
            .skill(skill)
            .ok_or(SessionError::UnknownSkill(skill))?
            .clone();
        let caster = self
            .state
            .entities
            .unit(unit)
            .ok_or(SessionError::NotCurrentUnit(unit))?;
        if !caster.skills.contains(&skill) {
            return Err(SessionError::SkillNotEquipped(unit, skill));
        }
        if !targeting::release_candidates(&self.map, &self.state, caster, &def.release)
            .contains(&release)
        {
            return Err(SessionError::InvalidRelease(release));
        }

        // Self-centered skills rotate their pattern; free and unit-targeted
        // releases use the authored orientation.
        let (release, facing) = match def.release {
            ReleaseKind::SelfCentered => {
                let facing = facing.unwrap_or(caster.facing);
                (caster.position, Some(facing))
            }
            _ => (release, None),
        };
        let multiplier = if def.uses_dice {
            let (a, b) = combat::DiceOracle::roll(&mut self.dice);
            let multiplier = combat::dice_multiplier(a + b);
            debug!(%unit, roll = a + b, multiplier, "dice");
            multiplier
        } else {
            1.0
        };

        if let Some(facing) = facing
            && let Some(caster) = self.state.entities.unit_mut(unit)
        {
            caster.facing = facing;
        }
        let targets = area::resolve(&self.map, release, &def.pattern, facing);
        if let Some(caster) = self.state.entities.unit_mut(unit) {
            caster.state = UnitState::Acting;
        }
        self.state
            .board
            .clear_annotations(CellState::Movable, &mut self.events);
        let run = PipelineRun::new(unit, &def, targets, multiplier, &mut self.events);
        self.activity = Activity::Casting(run);
        Ok(())
    }

    fn tick_moving(
        &mut self,
        unit: EntityId,
        path: Vec<Position>,
        mut leg: usize,
        mut progress: f32,
        dt: f32,
    ) {
        let speed = self
            .state
            .entities
            .unit(unit)
            .map(|unit| unit.move_speed)
            .unwrap_or(0.0);
        if speed <= 0.0 || path.len() < 2 {
            self.finish_move(unit);
            return;
        }
        progress += dt * speed;
        while progress >= 1.0 && leg + 1 < path.len() {
            progress -= 1.0;
            let to = path[leg + 1];
            let from = path[leg];
            let _ = self.state.move_unit(unit, to);
            self.events.push(Event::UnitMoved {
                id: unit,
                from,
                to,
                progress: 1.0,
            });
            leg += 1;
        }
        if leg + 1 >= path.len() {
            self.finish_move(unit);
            return;
        }
        self.events.push(Event::UnitMoved {
            id: unit,
            from: path[leg],
            to: path[leg + 1],
            progress: EasingCurve::Linear.evaluate(progress),
        });
        self.activity = Activity::Moving {
            unit,
            path,
            leg,
            progress,
        };
    }

    fn finish_move(&mut self, unit: EntityId) {
        if let Some(unit) = self.state.entities.unit_mut(unit) {
            unit.state = UnitState::Waiting;
        }
        self.activity = Activity::Idle;
    }

    fn tick_casting(&mut self, mut run: PipelineRun, dt: f32) {
        let caster = run.caster();
        match run.tick(dt, &mut self.state, &mut self.events) {
            PipelineStatus::Running => {
                self.activity = Activity::Casting(run);
            }
            PipelineStatus::Complete => {
                if let Some(unit) = self.state.entities.unit_mut(caster) {
                    unit.state = UnitState::Idle;
                }
                self.process_defeats();
                if self.state.entities.unit(caster).is_some() {
                    // Casting spends the rest of the turn.
                    TurnEngine::new(&mut self.state, &self.map).end_turn(&mut self.events);
                } else {
                    // The caster died to its own cast. Its removal already
                    // left the cursor on the next unit in order; enter that
                    // turn rather than advancing past it.
                    TurnEngine::new(&mut self.state, &self.map).start_turn(&mut self.events);
                }
                self.activity = Activity::Idle;
            }
        }
    }

    /// Removes every unit whose health reached zero during the finished
    /// pipeline. Defeat is read from the entities themselves, not from the
    /// event queue, which hosts may have drained mid-pipeline. Removal is
    /// deferred to here so a running effect timeline never sees the board
    /// change under it.
    fn process_defeats(&mut self) {
        let defeated: Vec<EntityId> = self
            .state
            .entities
            .iter()
            .filter(|unit| !unit.is_alive())
            .map(|unit| unit.id)
            .collect();
        for id in defeated {
            info!(unit = %id, "unit defeated");
            TurnEngine::new(&mut self.state, &self.map).remove_unit(id, &mut self.events);
        }
    }
}

/// Nearest free, passable cell to `wanted`, by BFS over neighbours. Returns
/// `wanted` itself when it is already open.
fn snap_to_free_cell(map: &GridMap, state: &GameState, wanted: Position) -> Option<Position> {
    use skirmish_core::MapOracle;
    use std::collections::{BTreeSet, VecDeque};

    let open = |cell: Position| map.is_passable(cell) && !state.board.is_occupied(cell);
    let mut frontier = VecDeque::from([wanted]);
    let mut seen = BTreeSet::from([wanted]);
    while let Some(cell) = frontier.pop_front() {
        if open(cell) {
            return Some(cell);
        }
        for neighbor in cell.neighbors() {
            if map.contains(neighbor) && seen.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }
    None
}
