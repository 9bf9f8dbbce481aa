use serde::{Deserialize, Serialize};

use crate::constants::{
    half_extents, CANNON_FIRE_INTERVAL_TICKS, LEAVES_FALL_DEPTH, LEAVES_REGEN_TICKS,
    PHASE_INTERVAL_TICKS,
};
use crate::math::{Aabb, Vec3};

/// Behavioral kind of a level obstacle. Adding a kind means adding a landing
/// arm in the collision resolver; everything else is data-driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Platform,
    Glass,
    Ice,
    Leaves,
    Bounce,
    SpeedPad,
    Sticky,
    Phase,
    Spike,
    Cannon,
    Finish,
}

impl ObstacleKind {
    /// Whether the AI planner may pick this obstacle as a stepping stone.
    /// Spikes kill, cannons are scenery, and the finish is routed separately.
    pub fn is_landable(self) -> bool {
        !matches!(self, Self::Spike | Self::Cannon | Self::Finish)
    }
}

/// One obstacle in the live registry.
///
/// Timed behavior (leaf crumble, canopy regrowth, phase toggles, cannon
/// shots) is expressed as absolute tick deadlines checked by [`advance`],
/// never as callbacks, so the struct stays plain data and replays exactly.
///
/// [`advance`]: Obstacle::advance
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub alive: bool,
    pub solid: bool,
    pub visible: bool,
    pub climbable: bool,
    /// Resting height for obstacles that move (crumbled leaves).
    pub rest_height: f32,
    pub crumble_at: Option<u64>,
    pub restore_at: Option<u64>,
    pub phase_at: Option<u64>,
    pub fire_at: Option<u64>,
    pub fire_dir: Vec3,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, position: Vec3, now: u64) -> Self {
        Self {
            id,
            kind,
            position,
            alive: true,
            solid: true,
            visible: true,
            climbable: matches!(kind, ObstacleKind::Sticky),
            rest_height: position.y,
            crumble_at: None,
            restore_at: None,
            phase_at: matches!(kind, ObstacleKind::Phase)
                .then_some(now + PHASE_INTERVAL_TICKS),
            fire_at: matches!(kind, ObstacleKind::Cannon)
                .then_some(now + CANNON_FIRE_INTERVAL_TICKS),
            fire_dir: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    pub fn with_fire_dir(mut self, dir: Vec3) -> Self {
        self.fire_dir = dir.normalized();
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::centered(self.position, half_extents(self.kind))
    }

    /// World-space y of the top face.
    pub fn top(&self) -> f32 {
        self.position.y + half_extents(self.kind).y
    }

    /// Runs this obstacle's due deadlines. Called once per tick for every
    /// live obstacle; deadlines on pruned obstacles are never consulted.
    pub fn advance(&mut self, now: u64) {
        if let Some(at) = self.phase_at {
            if now >= at {
                self.visible = !self.visible;
                self.solid = self.visible;
                self.phase_at = Some(at + PHASE_INTERVAL_TICKS);
            }
        }
        if let Some(at) = self.crumble_at {
            if now >= at {
                self.crumble_at = None;
                self.solid = false;
                self.position.y = self.rest_height - LEAVES_FALL_DEPTH;
                self.restore_at = Some(at + LEAVES_REGEN_TICKS);
            }
        }
        if let Some(at) = self.restore_at {
            if now >= at {
                self.restore_at = None;
                self.solid = true;
                self.position.y = self.rest_height;
            }
        }
    }
}
