//! External game-state store
//!
//! The simulation only calls mutators on this seam. Score, lives and level are
//! display state owned by the UI shell; [`MemoryStore`] is the stock
//! implementation for hosts that do not bring their own.

use serde::{Deserialize, Serialize};

use crate::consts::{EXTRA_LIFE_SCORE, STARTING_LIVES};

/// Top-level phase of the game shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Stage data still loading
    #[default]
    Loading,
    /// Title menu
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Mutators the core invokes on the game-state store
pub trait GameStore {
    fn set_loading(&mut self, loading: bool);
    fn set_phase(&mut self, phase: GamePhase);
    /// Deduct a life; the store decides whether the run is over
    fn lose_life(&mut self);
    fn advance_level(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
}

/// In-memory store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    pub phase: GamePhase,
    pub loading: bool,
    pub score: u64,
    pub top_score: u64,
    pub lives: u8,
    pub level: u32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            phase: GamePhase::Loading,
            loading: true,
            score: 0,
            top_score: 0,
            lives: STARTING_LIVES,
            level: 1,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points, tracking the top score and the one-time extra life
    pub fn add_score(&mut self, points: u64) {
        let before = self.score;
        self.score += points;
        self.top_score = self.top_score.max(self.score);
        if before < EXTRA_LIFE_SCORE && self.score >= EXTRA_LIFE_SCORE {
            self.lives = self.lives.saturating_add(1);
            log::info!("Extra life awarded at {} points", self.score);
        }
    }

    /// Start a fresh run (top score survives)
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.level = 1;
        self.phase = GamePhase::Playing;
    }
}

impl GameStore for MemoryStore {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    fn lose_life(&mut self) {
        let was_last = self.lives <= 1;
        self.lives = self.lives.saturating_sub(1);
        self.phase = if was_last {
            log::info!("Last life lost - game over");
            GamePhase::GameOver
        } else {
            GamePhase::Playing
        };
    }

    fn advance_level(&mut self) {
        self.level += 1;
    }

    fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }
}
