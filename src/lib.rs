//! Girder Climb - A 2D platform-climbing arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, per-tick rules)
//! - `stage`: Stage description loading and compilation
//! - `game_loop`: Fixed timestep driver and collaborator seams
//! - `input`: Explicit per-tick input state
//! - `store`: External game-state store seam
//! - `tuning`: Data-driven game balance

pub mod game_loop;
pub mod input;
pub mod sim;
pub mod stage;
pub mod store;
pub mod tuning;

pub use game_loop::{FixedStepClock, GameLoop, LoopState, NoRender, Renderer, Snapshot, boot};
pub use input::{Control, InputState, KeyBindings};
pub use stage::{CompiledStage, StageDescription, StageError, compile, load_stage, parse_stage};
pub use store::{GamePhase, GameStore, MemoryStore};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation timestep (60 Hz), rounded down to whole nanoseconds so
    /// host timestamps truncated to the nanosecond never come up a step short
    pub const FIXED_STEP: Duration = Duration::from_nanos(16_666_666);
    /// Fixed simulation timestep in seconds, as handed to entity updates
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Entity footprints (pixels)
    pub const ACTOR_SIZE: (f32, f32) = (12.0, 16.0);
    pub const BOSS_SIZE: (f32, f32) = (16.0, 16.0);
    pub const HAZARD_SIZE: (f32, f32) = (12.0, 12.0);
    pub const ITEM_SIZE: (f32, f32) = (16.0, 16.0);
    pub const RIVET_SIZE: (f32, f32) = (8.0, 8.0);
    pub const LADDER_WIDTH: f32 = 8.0;

    /// Lives a fresh run starts with
    pub const STARTING_LIVES: u8 = 3;
    /// Score at which a single extra life is awarded
    pub const EXTRA_LIFE_SCORE: u64 = 7_000;
}
