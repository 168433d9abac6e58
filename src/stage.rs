//! Stage descriptions and the stage compiler
//!
//! A stage file is a compact, tuple-heavy JSON document. Compiling it resolves
//! every tuple into a named record and derives each ladder gate's center column.
//! Field names in [`StageDescription`] are the on-disk contract.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Facing;

/// Errors raised while loading a stage
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to read stage {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed stage data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid stage: {0}")]
    Invalid(String),
}

/// Overall stage dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSize {
    pub w: f32,
    pub h: f32,
}

/// A conveyor belt segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conveyor {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub speed: f32,
    pub dir: Facing,
}

/// Named spawn points in authoring form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoints {
    #[serde(rename = "hero")]
    pub actor: [f32; 2],
    #[serde(rename = "gorilla")]
    pub boss: [f32; 2],
    #[serde(rename = "oilDrum", default, skip_serializing_if = "Option::is_none")]
    pub special: Option<[f32; 2]>,
}

/// Authoring format for a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDescription {
    pub size: StageSize,
    /// `[x, y, w, h]`
    pub solids: Vec<[f32; 4]>,
    /// `[x, y, h]` with `(x, y)` the ladder's top-left corner
    pub ladders: Vec<[f32; 3]>,
    /// `[x, y, w, h]`
    pub ladder_gates: Vec<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conveyors: Option<Vec<Conveyor>>,
    /// `[x, y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rivets: Option<Vec<[f32; 2]>>,
    pub spawns: SpawnPoints,
}

impl StageDescription {
    /// Reject geometry the collision code is not defined for
    pub fn validate(&self) -> Result<(), StageError> {
        if !all_finite(&[self.size.w, self.size.h]) || self.size.w <= 0.0 || self.size.h <= 0.0 {
            return Err(StageError::Invalid(format!(
                "stage size must be positive, got {}x{}",
                self.size.w, self.size.h
            )));
        }

        for (i, solid) in self.solids.iter().enumerate() {
            if !all_finite(&solid[..]) || solid[2] <= 0.0 || solid[3] <= 0.0 {
                return Err(StageError::Invalid(format!("solid {i} has degenerate box {solid:?}")));
            }
        }

        for (i, gate) in self.ladder_gates.iter().enumerate() {
            if !all_finite(&gate[..]) || gate[2] <= 0.0 || gate[3] <= 0.0 {
                return Err(StageError::Invalid(format!(
                    "ladder gate {i} has degenerate box {gate:?}"
                )));
            }
        }

        for (i, ladder) in self.ladders.iter().enumerate() {
            if !all_finite(&ladder[..]) || ladder[2] <= 0.0 {
                return Err(StageError::Invalid(format!(
                    "ladder {i} has non-positive height {ladder:?}"
                )));
            }
        }

        let conveyors = self.conveyors.as_deref().unwrap_or_default();
        for (i, c) in conveyors.iter().enumerate() {
            if !all_finite(&[c.x, c.y, c.w, c.speed]) || c.w <= 0.0 {
                return Err(StageError::Invalid(format!("conveyor {i} is malformed")));
            }
        }

        let mut points = vec![self.spawns.actor, self.spawns.boss];
        points.extend(self.spawns.special);
        points.extend(self.rivets.iter().flatten().copied());
        if points.iter().any(|p| !all_finite(&p[..])) {
            return Err(StageError::Invalid("non-finite spawn or rivet point".to_string()));
        }

        Ok(())
    }
}

/// Axis-aligned rectangle record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Vertical ladder segment hanging down `h` from its top-left `(x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderSegment {
    pub x: f32,
    pub y: f32,
    pub h: f32,
}

/// Zone where the actor may start climbing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderGate {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Horizontal center, rounded half-up to a whole pixel
    pub center_x: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawns {
    pub actor: Vec2,
    pub boss: Vec2,
    pub special: Option<Vec2>,
}

/// Runtime form of a stage. Immutable once compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStage {
    pub width: f32,
    pub height: f32,
    pub solids: Vec<Rect>,
    pub ladders: Vec<LadderSegment>,
    pub ladder_gates: Vec<LadderGate>,
    pub conveyors: Vec<Conveyor>,
    pub rivets: Vec<Vec2>,
    pub spawns: Spawns,
}

/// Compile a stage description. Pure and total.
pub fn compile(desc: &StageDescription) -> CompiledStage {
    let point = |[x, y]: [f32; 2]| Vec2::new(x, y);

    CompiledStage {
        width: desc.size.w,
        height: desc.size.h,
        solids: desc
            .solids
            .iter()
            .map(|&[x, y, w, h]| Rect { x, y, w, h })
            .collect(),
        ladders: desc
            .ladders
            .iter()
            .map(|&[x, y, h]| LadderSegment { x, y, h })
            .collect(),
        ladder_gates: desc
            .ladder_gates
            .iter()
            .map(|&[x, y, w, h]| LadderGate {
                x,
                y,
                w,
                h,
                center_x: round_half_up(x + w / 2.0),
            })
            .collect(),
        conveyors: desc.conveyors.clone().unwrap_or_default(),
        rivets: desc.rivets.iter().flatten().copied().map(point).collect(),
        spawns: Spawns {
            actor: point(desc.spawns.actor),
            boss: point(desc.spawns.boss),
            special: desc.spawns.special.map(point),
        },
    }
}

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[inline]
fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Parse, validate and compile stage JSON
pub fn parse_stage(json: &str) -> Result<CompiledStage, StageError> {
    let desc: StageDescription = serde_json::from_str(json)?;
    desc.validate()?;
    Ok(compile(&desc))
}

/// Load a stage file from disk
pub fn load_stage(path: impl AsRef<Path>) -> Result<CompiledStage, StageError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| StageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stage = parse_stage(&json)?;
    log::info!(
        "Loaded stage {} ({}x{}, {} solids, {} ladders, {} gates)",
        path.display(),
        stage.width,
        stage.height,
        stage.solids.len(),
        stage.ladders.len(),
        stage.ladder_gates.len()
    );
    Ok(stage)
}
