//! The deterministic game session.
//!
//! [`GameSession`] owns the whole world: both movers, the obstacle registry,
//! projectiles, the campaign position, and the RNG. One [`tick`] call is one
//! 60 Hz frame, and every timed behavior inside is an absolute tick deadline,
//! so the session is a pure state machine: seed + input sequence in, identical
//! [`WorldSnapshot`] stream out.
//!
//! The per-tick order is fixed: transitions and obstacle deadlines, player
//! intent and integration, player collision, projectiles, the AI racer, then
//! event collection. Tests and the benchmark harness rely on that order.
//!
//! [`tick`]: GameSession::tick

pub mod ai;
pub mod body;
pub mod collision;
pub mod level;
pub mod obstacle;
pub mod projectile;


use serde::{Deserialize, Serialize};

use crate::constants::{
    AI_SPAWN, BASE_MOVE_SPEED, JUMP_FORCE, LEVEL_COMPLETE_PAUSE_TICKS, MAX_LEVEL, PLAYER_SPAWN,
    SPRINT_MULTIPLIER, TICK_SECONDS,
};
use crate::error::GameError;
use crate::input::MoveIntent;
use crate::math::Vec3;
use crate::rng::SeededRng;

pub use ai::{AiDifficulty, AiPlanner, AiProfile};
pub use body::KinematicBody;
pub use collision::{resolve_collisions, SurfaceEvent};
pub use level::GeneratedLevel;
pub use obstacle::{Obstacle, ObstacleKind};
pub use projectile::{Bullet, BulletSpawner};

/// What killed a mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Void,
    Spike,
    Bullet,
}

/// Observable things that happened during one tick, in the order they
/// happened. The renderer drives effects (camera shake, shatter particles,
/// banners) from these instead of diffing snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    PlayerDied { cause: DeathCause },
    AiDied { cause: DeathCause },
    GlassShattered { id: u32 },
    Bounced,
    LevelComplete { level: u32, time_secs: f32, new_best: bool },
    AiFinished { time_secs: f32 },
    CampaignComplete,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub move_speed: f32,
}

impl BodySnapshot {
    fn of(body: &KinematicBody) -> Self {
        Self {
            position: body.position,
            velocity: body.velocity,
            grounded: body.grounded,
            move_speed: body.move_speed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiSnapshot {
    pub body: BodySnapshot,
    pub difficulty: AiDifficulty,
    pub deaths: u32,
    pub finish_secs: Option<f32>,
    pub target: Option<Vec3>,
    pub holding: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub id: u32,
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub solid: bool,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnerSnapshot {
    pub position: Vec3,
    pub direction: Vec3,
    pub fire_interval: u64,
}

/// Full render-ready world state after a tick. Everything a frontend needs,
/// nothing it can corrupt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub seed: u32,
    pub level: u32,
    pub elapsed_secs: f32,
    pub deaths: u32,
    pub best_time_secs: Option<f32>,
    pub is_playing: bool,
    pub level_complete: bool,
    pub campaign_complete: bool,
    pub player: BodySnapshot,
    pub ai: Option<AiSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
    pub spawners: Vec<SpawnerSnapshot>,
    pub finish_position: Vec3,
    /// Where a chase camera should look: the player, always.
    pub camera_target: Vec3,
    pub events: Vec<TickEvent>,
}

/// The HUD line: timer, deaths, level, bests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudReadout {
    pub level: u32,
    pub elapsed_secs: f32,
    pub deaths: u32,
    pub best_time_secs: Option<f32>,
    pub ai_finish_secs: Option<f32>,
}

/// The AI racer: a second body plus the planner that drives it.
#[derive(Clone, Debug)]
struct AiRacer {
    body: KinematicBody,
    planner: AiPlanner,
    deaths: u32,
    finish_secs: Option<f32>,
}

impl AiRacer {
    fn new(difficulty: AiDifficulty) -> Self {
        Self {
            body: KinematicBody::new(AI_SPAWN),
            planner: AiPlanner::new(difficulty),
            deaths: 0,
            finish_secs: None,
        }
    }
}

/// A complete game: campaign progress, both movers, and the live level.
#[derive(Clone, Debug)]
pub struct GameSession {
    seed: u32,
    rng: SeededRng,
    tick: u64,
    level: u32,
    level_started_at: u64,
    deaths: u32,
    best_times: [f32; MAX_LEVEL as usize],
    is_playing: bool,
    level_complete: bool,
    transition_at: Option<u64>,
    campaign_complete: bool,
    player: KinematicBody,
    ai: Option<AiRacer>,
    obstacles: Vec<Obstacle>,
    spawners: Vec<BulletSpawner>,
    bullets: Vec<Bullet>,
    events: Vec<TickEvent>,
}

impl GameSession {
    /// A fresh session in the menu state. Nothing simulates until
    /// [`start_game`] or [`load_level`].
    ///
    /// [`start_game`]: GameSession::start_game
    /// [`load_level`]: GameSession::load_level
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            rng: SeededRng::new(seed),
            tick: 0,
            level: 1,
            level_started_at: 0,
            deaths: 0,
            best_times: [f32::INFINITY; MAX_LEVEL as usize],
            is_playing: false,
            level_complete: false,
            transition_at: None,
            campaign_complete: false,
            player: KinematicBody::new(PLAYER_SPAWN),
            ai: None,
            obstacles: Vec::new(),
            spawners: Vec::new(),
            bullets: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Begins a campaign run: death counter cleared, level 1 loaded. Best
    /// times survive; they belong to the session, not the run.
    pub fn start_game(&mut self) {
        self.is_playing = true;
        self.campaign_complete = false;
        self.deaths = 0;
        self.load_level_inner(1);
    }

    /// Jumps straight to `level`, for practice or inspection. Starts play
    /// if the session was still in the menu.
    pub fn load_level(&mut self, level: u32) -> Result<(), GameError> {
        if level < 1 || level > MAX_LEVEL {
            return Err(GameError::LevelOutOfRange {
                requested: level,
                max: MAX_LEVEL,
            });
        }
        self.is_playing = true;
        self.load_level_inner(level);
        Ok(())
    }

    /// Turns the AI racer on at the given difficulty, or off if one is
    /// already running.
    pub fn toggle_ai(&mut self, difficulty: AiDifficulty) {
        if self.ai.take().is_some() {
            tracing::debug!("ai racer disabled");
        } else {
            tracing::debug!(difficulty = %difficulty, "ai racer enabled");
            self.ai = Some(AiRacer::new(difficulty));
        }
    }

    /// Re-tunes a running racer in place: same body, same position, new
    /// planner behavior from the next decision on. No-op with the AI off.
    pub fn change_ai_difficulty(&mut self, difficulty: AiDifficulty) {
        if let Some(racer) = self.ai.as_mut() {
            racer.planner.set_difficulty(difficulty);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_level(&self) -> u32 {
        self.level
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn elapsed_secs(&self) -> f32 {
        (self.tick - self.level_started_at) as f32 * TICK_SECONDS
    }

    /// Best completion time for a level this session, if it was ever
    /// completed.
    pub fn best_time(&self, level: u32) -> Option<f32> {
        let index = level.checked_sub(1)? as usize;
        let time = *self.best_times.get(index)?;
        time.is_finite().then_some(time)
    }

    /// Advances the world by one fixed 60 Hz step.
    pub fn tick(&mut self, intent: &MoveIntent) {
        if !self.is_playing {
            return;
        }
        let now = self.tick;
        self.events.clear();

        // Pending level transition fires first, so the new level gets a
        // whole tick.
        if self.transition_at.is_some_and(|at| now >= at) {
            self.advance_level();
            if !self.is_playing {
                return;
            }
        }

        for obstacle in &mut self.obstacles {
            obstacle.advance(now);
        }

        self.step_player(intent, now);
        self.step_projectiles(now);
        self.step_ai(now);

        self.tick += 1;
    }

    fn step_player(&mut self, intent: &MoveIntent, now: u64) {
        let base = if intent.sprint {
            BASE_MOVE_SPEED * SPRINT_MULTIPLIER
        } else {
            BASE_MOVE_SPEED
        };
        self.player.set_move_speed(base, now);
        self.player.apply_intent(intent);
        if intent.jump {
            self.player.try_jump(JUMP_FORCE);
        }
        // Grounded is re-earned every tick by standing on something, which
        // is how walking off an edge starts a fall.
        self.player.grounded = false;
        self.player.apply_gravity();
        self.player.integrate();

        let resolution = resolve_collisions(
            &mut self.player,
            &mut self.obstacles,
            JUMP_FORCE,
            intent.sprint,
            now,
        );
        for id in &resolution.shattered {
            self.events.push(TickEvent::GlassShattered { id: *id });
        }

        let mut died: Option<DeathCause> = None;
        match resolution.event {
            Some(SurfaceEvent::Spiked) => died = Some(DeathCause::Spike),
            Some(SurfaceEvent::Finished) => self.complete_level(now),
            Some(SurfaceEvent::Bounced) => self.events.push(TickEvent::Bounced),
            None => {}
        }

        self.player.snap_to_ground_pad();
        if died.is_none() && self.player.below_void() {
            died = Some(DeathCause::Void);
        }
        self.obstacles.retain(|o| o.alive);

        if let Some(cause) = died {
            self.kill_player(cause);
        }
    }

    fn step_projectiles(&mut self, now: u64) {
        projectile::fire_cannons(&mut self.obstacles, &mut self.bullets, now);

        let ai_body = self
            .ai
            .as_ref()
            .filter(|racer| racer.finish_secs.is_none())
            .map(|racer| &racer.body);
        let impacts = projectile::tick_projectiles(
            &mut self.bullets,
            &mut self.spawners,
            &self.player,
            ai_body,
            now,
        );

        if impacts.player_hit {
            self.kill_player(DeathCause::Bullet);
        }
        if impacts.ai_hit {
            if let Some(racer) = self.ai.as_mut() {
                racer.deaths += 1;
                racer.body.reset(AI_SPAWN);
                racer.planner.reset();
                self.events
                    .push(TickEvent::AiDied { cause: DeathCause::Bullet });
            }
        }
    }

    fn step_ai(&mut self, now: u64) {
        let level = self.level;
        let elapsed = self.elapsed_secs();
        let Some(racer) = self.ai.as_mut() else {
            return;
        };
        if racer.finish_secs.is_some() {
            // Finished racers stand at the finish until the next level.
            return;
        }
        // A bullet may already have reset the body this tick; it still gets
        // a normal step from the spawn.

        let profile = racer.planner.profile();
        racer.body.set_move_speed(profile.move_speed, now);
        racer.planner.decide(
            &mut racer.body,
            &self.obstacles,
            &self.bullets,
            level,
            now,
            &mut self.rng,
        );
        racer.body.grounded = false;
        racer.body.apply_gravity();
        racer.body.integrate();

        let resolution = resolve_collisions(
            &mut racer.body,
            &mut self.obstacles,
            profile.jump_force,
            false,
            now,
        );
        for id in &resolution.shattered {
            self.events.push(TickEvent::GlassShattered { id: *id });
        }

        let mut died: Option<DeathCause> = None;
        match resolution.event {
            Some(SurfaceEvent::Spiked) => died = Some(DeathCause::Spike),
            Some(SurfaceEvent::Finished) => {
                racer.finish_secs = Some(elapsed);
                self.events.push(TickEvent::AiFinished { time_secs: elapsed });
                tracing::debug!(time_secs = elapsed, "ai racer finished");
            }
            // The AI bouncing is not a camera event.
            Some(SurfaceEvent::Bounced) | None => {}
        }

        racer.body.snap_to_ground_pad();
        if died.is_none() && racer.body.below_void() {
            died = Some(DeathCause::Void);
        }
        self.obstacles.retain(|o| o.alive);

        if let Some(cause) = died {
            // A bullet in the projectile phase may have killed the racer
            // already; one death per tick.
            let already_died = self
                .events
                .iter()
                .any(|e| matches!(e, TickEvent::AiDied { .. }));
            if !already_died {
                racer.deaths += 1;
                racer.body.reset(AI_SPAWN);
                racer.planner.reset();
                self.events.push(TickEvent::AiDied { cause });
            }
        }
    }

    /// One death per tick, at most, and none while a completed level waits
    /// out its transition pause.
    fn kill_player(&mut self, cause: DeathCause) {
        if self.level_complete {
            return;
        }
        let already_died = self
            .events
            .iter()
            .any(|e| matches!(e, TickEvent::PlayerDied { .. }));
        if already_died {
            return;
        }
        self.deaths += 1;
        self.player.reset(PLAYER_SPAWN);
        self.events.push(TickEvent::PlayerDied { cause });
        tracing::debug!(?cause, total = self.deaths, "player died");
    }

    /// Latched: only the first finish contact of a level counts. Re-entry
    /// during the transition pause is a no-op.
    fn complete_level(&mut self, now: u64) {
        if self.level_complete {
            return;
        }
        self.level_complete = true;
        let time = self.elapsed_secs();
        let index = (self.level - 1) as usize;
        let new_best = time < self.best_times[index];
        if new_best {
            self.best_times[index] = time;
        }
        self.events.push(TickEvent::LevelComplete {
            level: self.level,
            time_secs: time,
            new_best,
        });
        self.transition_at = Some(now + LEVEL_COMPLETE_PAUSE_TICKS);
        tracing::debug!(level = self.level, time_secs = time, new_best, "level complete");
    }

    fn advance_level(&mut self) {
        self.transition_at = None;
        if self.level >= MAX_LEVEL {
            self.campaign_complete = true;
            self.is_playing = false;
            self.events.push(TickEvent::CampaignComplete);
            tracing::debug!("campaign complete");
            return;
        }
        let next = self.level + 1;
        self.load_level_inner(next);
    }

    /// Swaps in a freshly generated level and resets both movers. Every
    /// pending deadline dies here with the objects that owned it.
    fn load_level_inner(&mut self, level: u32) {
        self.level = level;
        let generated = level::generate(level, &mut self.rng, self.tick);
        self.obstacles = generated.obstacles;
        self.spawners = generated.spawners;
        self.bullets.clear();
        self.level_complete = false;
        self.transition_at = None;
        self.level_started_at = self.tick;
        self.player.reset(PLAYER_SPAWN);
        if let Some(racer) = self.ai.as_mut() {
            racer.body.reset(AI_SPAWN);
            racer.planner.reset();
            racer.finish_secs = None;
        }
        tracing::debug!(level, obstacles = self.obstacles.len(), "level loaded");
    }

    /// Render-ready copy of the world after the last tick.
    pub fn snapshot(&self) -> WorldSnapshot {
        let finish_position = self
            .obstacles
            .iter()
            .find(|o| o.kind == ObstacleKind::Finish)
            .map(|o| o.position)
            .unwrap_or(Vec3::ZERO);

        WorldSnapshot {
            tick: self.tick,
            seed: self.seed,
            level: self.level,
            elapsed_secs: self.elapsed_secs(),
            deaths: self.deaths,
            best_time_secs: self.best_time(self.level),
            is_playing: self.is_playing,
            level_complete: self.level_complete,
            campaign_complete: self.campaign_complete,
            player: BodySnapshot::of(&self.player),
            ai: self.ai.as_ref().map(|racer| AiSnapshot {
                body: BodySnapshot::of(&racer.body),
                difficulty: racer.planner.difficulty(),
                deaths: racer.deaths,
                finish_secs: racer.finish_secs,
                target: racer.planner.target(),
                holding: racer.planner.is_holding(),
            }),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| ObstacleSnapshot {
                    id: o.id,
                    kind: o.kind,
                    position: o.position,
                    solid: o.solid,
                    visible: o.visible,
                })
                .collect(),
            bullets: self
                .bullets
                .iter()
                .map(|b| BulletSnapshot {
                    position: b.position,
                    velocity: b.velocity,
                })
                .collect(),
            spawners: self
                .spawners
                .iter()
                .map(|s| SpawnerSnapshot {
                    position: s.position,
                    direction: s.direction,
                    fire_interval: s.fire_interval,
                })
                .collect(),
            finish_position,
            camera_target: self.player.position,
            events: self.events.clone(),
        }
    }

    /// The HUD numbers, without the cost of a full snapshot.
    pub fn hud(&self) -> HudReadout {
        HudReadout {
            level: self.level,
            elapsed_secs: self.elapsed_secs(),
            deaths: self.deaths,
            best_time_secs: self.best_time(self.level),
            ai_finish_secs: self.ai.as_ref().and_then(|racer| racer.finish_secs),
        }
    }
}
