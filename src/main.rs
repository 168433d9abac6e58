//! Girder Climb headless runner
//!
//! Boots a stage and drives the loop with synthetic frame timestamps and a
//! scripted input, logging what the simulation reports. Usage:
//!
//! ```text
//! girder-climb [stage.json] [seed] [tuning.json]
//! ```

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};

use girder_climb::consts::FIXED_STEP;
use girder_climb::sim::EntityType;
use girder_climb::{
    Control, GamePhase, GameStore, InputState, MemoryStore, Snapshot, Tuning, boot,
};

const DEFAULT_STAGE: &str = "stages/girders.json";
const DEFAULT_SEED: u64 = 0x6769_7264;
/// Forty seconds at 60 Hz
const FRAMES: u32 = 2400;
/// Frames spent walking from the spawn to the first ladder
const WALK_TO_FIRST: u32 = 120;
/// Frames holding Up on a ladder, enough to reach the girder above
const CLIMB: u32 = 130;
/// Frames to cross a girder to the ladder at its far end
const CROSS: u32 = 260;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Girder Climb (headless) starting...");

    let mut args = std::env::args().skip(1);
    let stage_path = args.next().unwrap_or_else(|| DEFAULT_STAGE.to_string());
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            log::error!("Invalid seed: {err}");
            return ExitCode::FAILURE;
        }
        None => DEFAULT_SEED,
    };
    let tuning = match args.next() {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Failed to load tuning: {err:#}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let mut store = MemoryStore::new();
    let mut game = match boot(&stage_path, seed, tuning, &mut store) {
        Ok(game) => game,
        Err(_) => return ExitCode::FAILURE,
    };

    store.set_phase(GamePhase::Playing);
    game.start(Duration::ZERO);

    let mut peak_hazards = 0;
    let mut renderer = |snapshot: &Snapshot<'_>| {
        let hazards = snapshot
            .entities
            .iter()
            .filter(|e| e.tag() == EntityType::Hazard)
            .count();
        peak_hazards = peak_hazards.max(hazards);
    };

    for frame in 1..=FRAMES {
        let input = scripted_input(frame);
        let now = FIXED_STEP * frame;
        game.frame(now, &input, &mut store, &mut renderer);

        if store.phase == GamePhase::GameOver {
            log::info!("Game over on frame {frame}");
            break;
        }
    }
    game.stop();

    let actor = game.world().actor();
    log::info!(
        "Finished: ticks={} lives={} level={} peak_hazards={} actor={:?}",
        game.world().ticks(),
        store.lives,
        store.level,
        peak_hazards,
        actor.map(|a| (a.transform.pos, a.actor_state()))
    );
    ExitCode::SUCCESS
}

/// Zigzag up the bundled stage: climb each ladder, then cross the girder
/// toward the next one, alternating right and left
fn scripted_input(frame: u32) -> InputState {
    if frame <= WALK_TO_FIRST {
        return InputState::holding(&[Control::Left]);
    }
    let since = frame - WALK_TO_FIRST;
    let girder = since / (CLIMB + CROSS);
    if since % (CLIMB + CROSS) < CLIMB {
        InputState::holding(&[Control::Up])
    } else if girder % 2 == 0 {
        InputState::holding(&[Control::Right])
    } else {
        InputState::holding(&[Control::Left])
    }
}

fn load_tuning(path: &str) -> Result<Tuning> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    Tuning::from_json(&text).with_context(|| format!("parsing {path}"))
}
