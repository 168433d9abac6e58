//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so a stage pack can
//! ship its own feel without touching code. Speeds are pixels per second,
//! accelerations pixels per second squared.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Actor ===
    /// Horizontal run speed
    pub run_speed: f32,
    /// Vertical velocity applied on jump (negative is up)
    pub jump_velocity: f32,
    /// Downward acceleration for actor and rolling hazards
    pub gravity: f32,
    /// Ladder climb speed
    pub climb_speed: f32,
    /// Center the actor on a gate when it starts climbing
    pub snap_to_gate_center: bool,

    // === Hazards ===
    /// Rolling hazard horizontal speed
    pub roll_speed: f32,
    /// Boss releases hazards at all
    pub boss_releases_hazards: bool,
    /// Shortest wait between releases (ticks)
    pub hazard_interval_min: u32,
    /// Longest wait between releases (ticks)
    pub hazard_interval_max: u32,
    /// Live hazard cap
    pub max_hazards: usize,

    // === Stage rules ===
    /// Actor y below this clears the stage
    pub goal_y: f32,
    /// Broad-phase cell size (pixels)
    pub grid_cell_size: f32,

    // === Loop ===
    /// Longest host frame the clock will account for (milliseconds)
    pub max_frame_time_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            run_speed: 54.0,
            jump_velocity: -360.0,
            gravity: 1260.0,
            climb_speed: 36.0,
            snap_to_gate_center: false,

            roll_speed: 42.0,
            boss_releases_hazards: true,
            hazard_interval_min: 90,
            hazard_interval_max: 240,
            max_hazards: 6,

            goal_y: 24.0,
            grid_cell_size: 16.0,

            max_frame_time_ms: 250,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Frame clamp as a duration
    pub fn max_frame_time(&self) -> Duration {
        Duration::from_millis(self.max_frame_time_ms)
    }

    /// Tuning with the boss kept quiet (scripted scenarios, tests)
    pub fn without_hazard_release() -> Self {
        Self {
            boss_releases_hazards: false,
            ..Self::default()
        }
    }
}
