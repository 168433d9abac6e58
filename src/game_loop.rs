//! Fixed timestep driver
//!
//! The host calls [`GameLoop::frame`] once per display frame with a monotonic
//! timestamp. Elapsed time is banked in an accumulator and drained in whole
//! steps; the leftover fraction is handed to the renderer for interpolation
//! and never feeds back into the simulation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::consts::{FIXED_STEP, SIM_DT};
use crate::input::InputState;
use crate::sim::{Entity, TickOutcome, World, tick};
use crate::stage::{StageError, load_stage};
use crate::store::{GamePhase, GameStore};
use crate::tuning::Tuning;

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub entities: &'a [Entity],
    /// Fraction of a step banked in the accumulator, in [0, 1)
    pub alpha: f32,
    /// Ticks simulated so far
    pub tick: u64,
}

/// Anything that can draw a snapshot
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot<'_>);
}

impl<F: FnMut(&Snapshot<'_>)> Renderer for F {
    fn draw(&mut self, snapshot: &Snapshot<'_>) {
        self(snapshot)
    }
}

/// Renderer that discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRender;

impl Renderer for NoRender {
    fn draw(&mut self, _snapshot: &Snapshot<'_>) {}
}

/// Accumulator that converts host time into whole simulation steps
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: Duration,
    max_frame: Duration,
    accumulator: Duration,
    last: Option<Duration>,
}

impl FixedStepClock {
    pub fn new(step: Duration, max_frame: Duration) -> Self {
        Self {
            step,
            max_frame,
            accumulator: Duration::ZERO,
            last: None,
        }
    }

    /// Forget banked time and measure from `now`
    pub fn reset(&mut self, now: Duration) {
        self.accumulator = Duration::ZERO;
        self.last = Some(now);
    }

    /// Bank time up to `now` and return how many whole steps are due
    pub fn advance(&mut self, now: Duration) -> u32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_sub(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        self.accumulator += elapsed.min(self.max_frame);

        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    /// Banked fraction of a step
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Owns a spawned world and drives it at a fixed rate
///
/// Only constructible from a [`World`], so it can never tick a stage that has
/// not finished loading.
pub struct GameLoop {
    state: LoopState,
    clock: FixedStepClock,
    world: World,
    tuning: Tuning,
}

impl GameLoop {
    pub fn new(world: World, tuning: Tuning) -> Self {
        Self {
            state: LoopState::Stopped,
            clock: FixedStepClock::new(FIXED_STEP, tuning.max_frame_time()),
            world,
            tuning,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Begin scheduling ticks; no-op while already running
    pub fn start(&mut self, now: Duration) {
        if self.is_running() {
            return;
        }
        self.state = LoopState::Running;
        self.clock.reset(now);
        log::info!("Loop started");
    }

    /// Stop scheduling further ticks
    pub fn stop(&mut self) {
        if self.is_running() {
            log::info!("Loop stopped after {} ticks", self.world.ticks());
        }
        self.state = LoopState::Stopped;
    }

    /// Host frame callback. Returns the number of ticks run.
    pub fn frame<S, R>(&mut self, now: Duration, input: &InputState, store: &mut S, renderer: &mut R) -> u32
    where
        S: GameStore + ?Sized,
        R: Renderer + ?Sized,
    {
        if !self.is_running() {
            return 0;
        }

        let steps = self.clock.advance(now);
        for _ in 0..steps {
            self.step(input, store);
        }

        renderer.draw(&Snapshot {
            entities: self.world.entities(),
            alpha: self.clock.alpha(),
            tick: self.world.ticks(),
        });
        steps
    }

    /// Run exactly one tick and apply its outcome
    pub fn step<S: GameStore + ?Sized>(&mut self, input: &InputState, store: &mut S) -> TickOutcome {
        let outcome = tick(&mut self.world, input, &self.tuning, SIM_DT);
        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::ActorDied => {
                store.lose_life();
                self.world.respawn(&self.tuning);
            }
            TickOutcome::StageCleared => {
                store.advance_level();
                self.world.respawn(&self.tuning);
            }
        }
        outcome
    }
}

/// Load a stage and build a loop ready to start
///
/// Fail-stop: a stage that cannot be read or parsed leaves the store out of the
/// loading state and returns the error; there is no fallback stage.
pub fn boot<S: GameStore + ?Sized>(
    path: impl AsRef<Path>,
    seed: u64,
    tuning: Tuning,
    store: &mut S,
) -> Result<GameLoop, StageError> {
    store.set_loading(true);

    let stage = match load_stage(path) {
        Ok(stage) => stage,
        Err(err) => {
            log::error!("Failed to boot game: {err}");
            store.set_loading(false);
            return Err(err);
        }
    };

    let world = World::new(Arc::new(stage), seed, &tuning);
    log::info!("Game initialized with seed: {seed}");

    store.set_loading(false);
    store.set_phase(GamePhase::Menu);
    Ok(GameLoop::new(world, tuning))
}
