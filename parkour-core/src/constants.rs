//! Tuning constants for the parkour simulation.
//!
//! All motion quantities are expressed per tick at the fixed 60 Hz timestep.
//! Durations are tick counts; the trailing comments give the wall-clock
//! equivalent.

use crate::math::Vec3;
use crate::sim::obstacle::ObstacleKind;

// Timestep
pub const TICK_HZ: u32 = 60;
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

// Player movement
pub const BASE_MOVE_SPEED: f32 = 0.15; // units per tick
pub const SPRINT_MULTIPLIER: f32 = 1.8;
pub const GRAVITY: f32 = -0.015; // units per tick^2
pub const JUMP_FORCE: f32 = 0.3; // instantaneous vertical velocity
pub const PLATFORM_FRICTION: f32 = 0.98; // horizontal damping on landing

// World geometry
pub const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.5, 0.5);
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 0.0, 0.0);
pub const AI_SPAWN: Vec3 = Vec3::new(2.0, 0.0, 0.0);
pub const GROUND_PAD_HALF_EXTENT: f32 = 10.0; // spawn pad reaches x,z in [-10, 10]
pub const GROUND_PAD_SNAP_DEPTH: f32 = 1.0; // deeper falls over the pad are real falls
pub const VOID_DEATH_Y: f32 = -10.0;

// Campaign
pub const MAX_LEVEL: u32 = 50;
pub const LEVEL_COMPLETE_PAUSE_TICKS: u64 = 120; // 2s * 60fps

// Obstacle geometry
pub const PLATFORM_HALF_EXTENTS: Vec3 = Vec3::new(1.0, 0.25, 1.0);
pub const FINISH_HALF_EXTENTS: Vec3 = Vec3::new(1.0, 0.5, 1.0);
pub const CANNON_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.5, 0.5);

// Surface behavior
pub const LANDING_TOLERANCE: f32 = 0.5; // bottom-versus-top slack for landings
pub const GLASS_BREAK_SPEED: f32 = 0.2; // downward speed that shatters glass
pub const ICE_ACCELERATION: f32 = 1.05; // per-tick slide multiplier
pub const ICE_SPEED_CAP: f32 = 2.0; // times BASE_MOVE_SPEED
pub const LEAVES_SUPPORT_TICKS: u64 = 30; // 500ms * 60fps
pub const LEAVES_REGEN_TICKS: u64 = 180; // 3s * 60fps
pub const LEAVES_FALL_DEPTH: f32 = 8.0; // how far a crumbled canopy drops
pub const BOUNCE_KICK: f32 = 0.15; // added on top of the mover's jump force
pub const SPEED_BOOST_FACTOR: f32 = 1.5;
pub const SPEED_BOOST_TICKS: u64 = 180; // 3s * 60fps
pub const PHASE_INTERVAL_TICKS: u64 = 120; // 2s * 60fps

// Projectiles
pub const BULLET_SPEED: f32 = 0.25; // units per tick
pub const BULLET_HIT_RADIUS: f32 = 0.6;
pub const BULLET_CULL_RADIUS: f32 = 50.0; // travel distance from origin
pub const CANNON_FIRE_INTERVAL_TICKS: u64 = 150; // 2.5s * 60fps
pub const SPAWNER_UNLOCK_LEVEL: u32 = 30;
pub const SPAWNER_BASE_INTERVAL_TICKS: u64 = 120; // 2s * 60fps
pub const SPAWNER_MIN_INTERVAL_TICKS: u64 = 48; // 0.8s * 60fps
pub const SPAWNER_CAP: usize = 4;

// AI planner
pub const AI_TARGET_REACHED_DISTANCE: f32 = 1.0;
pub const AI_TARGET_CLEARANCE_Y: f32 = 1.0; // aim above the platform, not at it
pub const AI_JUMP_TRIGGER_RISE: f32 = 0.5; // jump only for meaningfully higher targets
pub const AI_ERROR_NUDGE: f32 = 0.1; // velocity perturbation on a flubbed decision
pub const AI_DODGE_NUDGE: f32 = 0.1;
pub const BULLET_LOOKAHEAD_TICKS: f32 = 5.0;
pub const BULLET_DANGER_RADIUS: f32 = 1.5;

/// Collision half extents for an obstacle of the given kind.
///
/// Most obstacles share the platform footprint; finish blocks are taller so
/// a sprinting jump cannot sail over them, and cannons are compact cubes.
pub fn half_extents(kind: ObstacleKind) -> Vec3 {
    match kind {
        ObstacleKind::Finish => FINISH_HALF_EXTENTS,
        ObstacleKind::Cannon => CANNON_HALF_EXTENTS,
        _ => PLATFORM_HALF_EXTENTS,
    }
}
