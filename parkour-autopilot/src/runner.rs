//! Headless race driver.
//!
//! Runs one AI racer over one level with the human slot idle and reports
//! what happened. This is the unit of work the benchmark grid fans out over.

use anyhow::{bail, Context, Result};
use serde::Serialize;

use parkour_core::constants::TICK_HZ;
use parkour_core::{AiDifficulty, DeathCause, GameSession, MoveIntent, TickEvent};

/// Everything worth keeping from a single race.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub difficulty: String,
    pub level: u32,
    pub seed: u32,
    pub max_ticks: u64,
    /// Ticks actually simulated. Equal to `max_ticks` unless the racer
    /// finished early.
    pub ticks: u64,
    pub finished: bool,
    pub finish_secs: Option<f32>,
    pub deaths: u32,
    pub void_deaths: u32,
    pub spike_deaths: u32,
    pub bullet_deaths: u32,
    /// Ticks spent parked because no platform was in flight range.
    pub holding_ticks: u64,
    /// Deepest course progress reached at any point, in world units.
    pub furthest_z: f32,
}

/// Wall-clock seconds a tick count corresponds to at the fixed timestep.
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 / TICK_HZ as f32
}

/// Race one difficulty tier over one level and collect its metrics.
///
/// The human body stays parked on the spawn pad for the whole run, so every
/// death and finish in the result belongs to the racer.
pub fn run_race(
    difficulty: AiDifficulty,
    level: u32,
    seed: u32,
    max_ticks: u64,
) -> Result<RunMetrics> {
    if max_ticks == 0 {
        bail!("max_ticks must be at least 1");
    }

    let mut session = GameSession::new(seed);
    session.start_game();
    session
        .load_level(level)
        .with_context(|| format!("loading level {level}"))?;
    session.toggle_ai(difficulty);

    let idle = MoveIntent::neutral();
    let mut metrics = RunMetrics {
        difficulty: difficulty.as_str().to_string(),
        level,
        seed,
        max_ticks,
        ticks: 0,
        finished: false,
        finish_secs: None,
        deaths: 0,
        void_deaths: 0,
        spike_deaths: 0,
        bullet_deaths: 0,
        holding_ticks: 0,
        furthest_z: 0.0,
    };

    for _ in 0..max_ticks {
        session.tick(&idle);
        let snapshot = session.snapshot();
        metrics.ticks = snapshot.tick;

        if let Some(ai) = &snapshot.ai {
            metrics.furthest_z = metrics.furthest_z.max(ai.body.position.z);
            if ai.holding {
                metrics.holding_ticks += 1;
            }
        }
        for event in &snapshot.events {
            match event {
                TickEvent::AiDied { cause } => match cause {
                    DeathCause::Void => metrics.void_deaths += 1,
                    DeathCause::Spike => metrics.spike_deaths += 1,
                    DeathCause::Bullet => metrics.bullet_deaths += 1,
                },
                TickEvent::AiFinished { time_secs } => {
                    metrics.finished = true;
                    metrics.finish_secs = Some(*time_secs);
                }
                _ => {}
            }
        }
        if metrics.finished {
            break;
        }
    }

    metrics.deaths = metrics.void_deaths + metrics.spike_deaths + metrics.bullet_deaths;
    Ok(metrics)
}
