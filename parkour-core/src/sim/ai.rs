//! The AI racer: a difficulty-tuned planner that steers a second
//! [`KinematicBody`] through the same physics the player uses.
//!
//! The planner cheats at nothing. It reads the obstacle registry, picks the
//! most forward reachable platform, and writes horizontal velocity and jump
//! impulses exactly as the input layer does for the player. Imperfection is
//! modeled, not accidental: decisions are gated by a reaction delay and each
//! decision can flub into a random velocity perturbation.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AI_DODGE_NUDGE, AI_ERROR_NUDGE, AI_JUMP_TRIGGER_RISE, AI_TARGET_CLEARANCE_Y,
    AI_TARGET_REACHED_DISTANCE, BULLET_DANGER_RADIUS, BULLET_LOOKAHEAD_TICKS, GRAVITY,
    SPAWNER_UNLOCK_LEVEL,
};
use crate::math::Vec3;
use crate::rng::SeededRng;
use crate::sim::body::KinematicBody;
use crate::sim::obstacle::{Obstacle, ObstacleKind};
use crate::sim::projectile::Bullet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Perfect,
}

impl AiDifficulty {
    pub const ALL: [AiDifficulty; 5] = [
        AiDifficulty::Easy,
        AiDifficulty::Medium,
        AiDifficulty::Hard,
        AiDifficulty::Expert,
        AiDifficulty::Perfect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
            Self::Perfect => "perfect",
        }
    }
}

impl fmt::Display for AiDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning knobs behind a difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Horizontal speed in units per tick. The player's base is 0.15.
    pub move_speed: f32,
    /// Jump impulse. The player's is 0.3.
    pub jump_force: f32,
    /// Ticks between planner decisions. Zero replans every tick.
    pub reaction_ticks: u64,
    /// Probability that a decision collapses into a random stumble.
    pub error_rate: f32,
}

impl AiProfile {
    pub const fn for_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self {
                move_speed: 0.10,
                jump_force: 0.25,
                reaction_ticks: 24,
                error_rate: 0.30,
            },
            AiDifficulty::Medium => Self {
                move_speed: 0.12,
                jump_force: 0.28,
                reaction_ticks: 18,
                error_rate: 0.20,
            },
            AiDifficulty::Hard => Self {
                move_speed: 0.14,
                jump_force: 0.30,
                reaction_ticks: 12,
                error_rate: 0.10,
            },
            AiDifficulty::Expert => Self {
                move_speed: 0.16,
                jump_force: 0.32,
                reaction_ticks: 6,
                error_rate: 0.05,
            },
            AiDifficulty::Perfect => Self {
                move_speed: 0.18,
                jump_force: 0.34,
                reaction_ticks: 0,
                error_rate: 0.0,
            },
        }
    }
}

/// Flat-ground jump span in world units: full time of flight times
/// horizontal speed. Grows with speed and jump force, shrinks as gravity
/// strengthens. The planner uses it as a coarse proximity gate before
/// routing straight at the finish.
pub fn jump_range(move_speed: f32, jump_force: f32, gravity: f32) -> f32 {
    move_speed * (2.0 * jump_force / -gravity)
}

/// Horizontal span of a jump that must land `rise` units above its launch
/// point, or `None` when even the apex cannot clear the climb. A negative
/// `rise` is a drop and extends the flight.
pub fn hop_reach(move_speed: f32, jump_force: f32, gravity: f32, rise: f32) -> Option<f32> {
    let pull = -gravity;
    let apex = jump_force * jump_force / (2.0 * pull);
    if rise > apex {
        return None;
    }
    let descent = (jump_force * jump_force - 2.0 * pull * rise).sqrt();
    Some(move_speed * (jump_force + descent) / pull)
}

/// Per-racer planning state. Owns no body; the session passes one in each
/// tick along with a read-only view of the world.
#[derive(Clone, Debug)]
pub struct AiPlanner {
    difficulty: AiDifficulty,
    profile: AiProfile,
    target: Option<Vec3>,
    path: Vec<Vec3>,
    next_decision: u64,
    holding: bool,
}

impl AiPlanner {
    pub fn new(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            profile: AiProfile::for_difficulty(difficulty),
            target: None,
            path: Vec::new(),
            next_decision: 0,
            holding: false,
        }
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.difficulty
    }

    pub fn profile(&self) -> AiProfile {
        self.profile
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// True when the last plan found nowhere to go and the racer is parked.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Switches tiers mid-run. The current plan is discarded; the next
    /// decision replans with the new tuning.
    pub fn set_difficulty(&mut self, difficulty: AiDifficulty) {
        self.difficulty = difficulty;
        self.profile = AiProfile::for_difficulty(difficulty);
        self.reset();
    }

    /// Clears plan state after a respawn or level load.
    pub fn reset(&mut self) {
        self.target = None;
        self.path.clear();
        self.next_decision = 0;
        self.holding = false;
    }

    /// Drives one tick of the racer: replans when due, then steers. Only
    /// decision ticks consume randomness, so reaction delay is also what
    /// spaces out mistakes.
    pub fn decide(
        &mut self,
        body: &mut KinematicBody,
        obstacles: &[Obstacle],
        bullets: &[Bullet],
        level: u32,
        now: u64,
        rng: &mut SeededRng,
    ) {
        let decision_tick = now >= self.next_decision;
        if decision_tick {
            self.next_decision = now + self.profile.reaction_ticks;

            if rng.chance(self.profile.error_rate) {
                // A flubbed decision: stumble instead of planning, and skip
                // steering so the stumble actually moves the body.
                body.velocity.x += rng.next_range_f32(-AI_ERROR_NUDGE, AI_ERROR_NUDGE);
                body.velocity.z += rng.next_range_f32(-AI_ERROR_NUDGE, AI_ERROR_NUDGE);
                return;
            }

            let arrived = match self.target {
                Some(target) => {
                    body.grounded
                        && body.position.distance(target) < AI_TARGET_REACHED_DISTANCE
                }
                None => true,
            };
            if arrived {
                self.plan(body, obstacles);
            }
        }

        self.steer(body);

        if decision_tick && level >= SPAWNER_UNLOCK_LEVEL {
            self.dodge_bullets(body, bullets);
        }
    }

    /// Picks the next waypoint. The finish is routed directly once it is
    /// within double the flat jump span and a single hop can fly there;
    /// otherwise candidates are live, solid, landable obstacles at or above
    /// the racer's feet whose climb and gap fit one jump arc, ranked by how
    /// much forward progress they buy.
    fn plan(&mut self, body: &KinematicBody, obstacles: &[Obstacle]) {
        self.path.clear();
        self.target = None;
        let range = jump_range(self.profile.move_speed, self.profile.jump_force, GRAVITY);

        let finish = obstacles
            .iter()
            .find(|o| o.alive && o.kind == ObstacleKind::Finish);
        if let Some(finish) = finish {
            if reach_cost(body.position, finish.position) <= 2.0 * range
                && self.can_hop_to(body, finish)
            {
                let point = target_point(finish);
                self.path.push(point);
                self.target = Some(point);
                self.holding = false;
                return;
            }
        }

        let feet = body.bottom();
        let mut candidates: Vec<&Obstacle> = obstacles
            .iter()
            .filter(|o| o.alive && o.solid && o.kind.is_landable())
            .filter(|o| o.top() >= feet - 0.01)
            .filter(|o| self.can_hop_to(body, o))
            .filter(|o| {
                // Skip whatever we are already standing on.
                target_point(o).distance(body.position) >= AI_TARGET_REACHED_DISTANCE
            })
            .collect();

        if candidates.is_empty() {
            if !self.holding {
                self.holding = true;
                tracing::debug!(
                    x = body.position.x,
                    y = body.position.y,
                    z = body.position.z,
                    "no reachable platform, holding"
                );
            }
            return;
        }

        self.holding = false;
        candidates.sort_by(|a, b| progress_score(b).total_cmp(&progress_score(a)));
        self.path = candidates.iter().map(|o| target_point(o)).collect();
        self.target = self.path.first().copied();
    }

    /// One-hop flight check: the climb to stand on the obstacle must stay
    /// under this profile's apex and the horizontal gap within the arc's
    /// span.
    fn can_hop_to(&self, body: &KinematicBody, obstacle: &Obstacle) -> bool {
        let rise = obstacle.top() + body.half_extents.y - body.position.y;
        let Some(reach) =
            hop_reach(self.profile.move_speed, self.profile.jump_force, GRAVITY, rise)
        else {
            return false;
        };
        body.position.horizontal_distance(obstacle.position) <= reach
    }

    /// Writes horizontal velocity toward the target and jumps off the
    /// ground for meaningfully higher waypoints. With no target the racer
    /// parks rather than strolling into the void.
    fn steer(&self, body: &mut KinematicBody) {
        let Some(target) = self.target else {
            body.velocity.x = 0.0;
            body.velocity.z = 0.0;
            return;
        };

        let dx = target.x - body.position.x;
        let dz = target.z - body.position.z;
        let horizontal = (dx * dx + dz * dz).sqrt();
        if horizontal > 1e-4 {
            body.velocity.x = dx / horizontal * body.move_speed;
            body.velocity.z = dz / horizontal * body.move_speed;
        } else {
            body.velocity.x = 0.0;
            body.velocity.z = 0.0;
        }

        if target.y - body.position.y > AI_JUMP_TRIGGER_RISE {
            body.try_jump(self.profile.jump_force);
        }
    }

    /// Sidesteps bullets whose extrapolated position comes close: a nudge
    /// perpendicular to the bullet's travel, pointed away from the
    /// projected impact.
    fn dodge_bullets(&self, body: &mut KinematicBody, bullets: &[Bullet]) {
        for bullet in bullets {
            let projected = bullet.position + bullet.velocity.scale(BULLET_LOOKAHEAD_TICKS);
            if projected.distance(body.position) >= BULLET_DANGER_RADIUS {
                continue;
            }
            let travel = bullet.velocity.normalized();
            let mut lateral = Vec3::new(-travel.z, 0.0, travel.x);
            if lateral.dot(body.position - projected) < 0.0 {
                lateral = lateral.scale(-1.0);
            }
            body.velocity.x += lateral.x * AI_DODGE_NUDGE;
            body.velocity.z += lateral.z * AI_DODGE_NUDGE;
        }
    }
}

/// Forward progress metric: depth along the course is worth twice height.
fn progress_score(obstacle: &Obstacle) -> f32 {
    obstacle.position.z * 2.0 + obstacle.position.y
}

/// Waypoints aim one unit above the obstacle so the racer clears the lip
/// instead of clipping it.
fn target_point(obstacle: &Obstacle) -> Vec3 {
    obstacle.position + Vec3::new(0.0, AI_TARGET_CLEARANCE_Y, 0.0)
}

/// Cost of a hop: horizontal distance plus any climb. Descents are free.
fn reach_cost(from: Vec3, to: Vec3) -> f32 {
    from.horizontal_distance(to) + (to.y - from.y).max(0.0)
}
