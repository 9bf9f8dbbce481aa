use crate::constants::{
    BASE_MOVE_SPEED, GRAVITY, GROUND_PAD_HALF_EXTENT, GROUND_PAD_SNAP_DEPTH,
    PLAYER_HALF_EXTENTS, SPEED_BOOST_FACTOR, VOID_DEATH_Y,
};
use crate::input::MoveIntent;
use crate::math::{Aabb, Vec3};

/// A box-shaped mover integrated under gravity. The player and the AI racer
/// are both instances of this; only the thing that writes their horizontal
/// velocity differs.
#[derive(Clone, Debug)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Effective horizontal speed for this tick, after sprint, boosts, and
    /// surface effects.
    pub move_speed: f32,
    pub half_extents: Vec3,
    /// Speed-pad boost expiry, as an absolute tick deadline.
    pub boost_until: Option<u64>,
}

impl KinematicBody {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            grounded: false,
            move_speed: BASE_MOVE_SPEED,
            half_extents: PLAYER_HALF_EXTENTS,
            boost_until: None,
        }
    }

    /// Respawn at `spawn` with all motion state cleared. Also cancels any
    /// speed boost, so a death during a boost does not carry it over.
    pub fn reset(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.grounded = false;
        self.boost_until = None;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::centered(self.position, self.half_extents)
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.half_extents.y
    }

    /// Sets this tick's horizontal speed from a base (already including
    /// sprint for the player, or the AI profile speed), applying an active
    /// speed-pad boost. Expired boosts are dropped here.
    pub fn set_move_speed(&mut self, base: f32, now: u64) {
        if self.boost_until.is_some_and(|until| now >= until) {
            self.boost_until = None;
        }
        self.move_speed = if self.boost_until.is_some() {
            base * SPEED_BOOST_FACTOR
        } else {
            base
        };
    }

    /// Rewrites horizontal velocity from a camera-relative intent. A neutral
    /// intent leaves velocity alone so surface effects like ice slide keep
    /// acting on it.
    pub fn apply_intent(&mut self, intent: &MoveIntent) {
        let forward = f32::from(intent.forward.clamp(-1, 1));
        let strafe = f32::from(intent.strafe.clamp(-1, 1));
        if forward == 0.0 && strafe == 0.0 {
            return;
        }
        let (sin, cos) = intent.camera_yaw.sin_cos();
        let dir = Vec3::new(
            strafe * cos + forward * sin,
            0.0,
            forward * cos - strafe * sin,
        )
        .normalized();
        self.velocity.x = dir.x * self.move_speed;
        self.velocity.z = dir.z * self.move_speed;
    }

    /// Starts a jump if grounded. Returns whether the jump happened; the
    /// grounded gate is what prevents double jumps.
    pub fn try_jump(&mut self, jump_force: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity.y = jump_force;
        self.grounded = false;
        true
    }

    pub fn apply_gravity(&mut self) {
        if !self.grounded {
            self.velocity.y += GRAVITY;
        }
    }

    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    /// Catches a shallow fall onto the spawn pad, a flat slab around the
    /// origin. Deep falls inside the pad's footprint are left alone: a body
    /// that sailed off a high route must still reach the void plane and die
    /// there, not teleport back up.
    pub fn snap_to_ground_pad(&mut self) -> bool {
        let on_pad = self.position.x.abs() <= GROUND_PAD_HALF_EXTENT
            && self.position.z.abs() <= GROUND_PAD_HALF_EXTENT;
        if on_pad && self.position.y <= 0.0 && self.position.y >= -GROUND_PAD_SNAP_DEPTH {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
            self.grounded = true;
            return true;
        }
        false
    }

    pub fn below_void(&self) -> bool {
        self.position.y < VOID_DEATH_Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    fn airborne_at_origin() -> KinematicBody {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.position.y = 5.0;
        body
    }

    #[test]
    fn free_fall_accumulates_gravity_per_tick() {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.position = Vec3::new(0.0, 3.0, 0.0);

        body.apply_gravity();
        body.integrate();
        assert!((body.velocity.y - GRAVITY).abs() < 1e-6);
        assert!((body.position.y - (3.0 + GRAVITY)).abs() < 1e-6);

        body.apply_gravity();
        body.integrate();
        assert!((body.velocity.y - 2.0 * GRAVITY).abs() < 1e-6);
        assert!((body.position.y - (3.0 + 3.0 * GRAVITY)).abs() < 1e-6);
    }

    #[test]
    fn grounded_body_ignores_gravity() {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.grounded = true;
        body.apply_gravity();
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn intent_is_camera_relative() {
        let mut body = airborne_at_origin();
        body.move_speed = 0.15;

        // Yaw zero: forward is +z.
        body.apply_intent(&MoveIntent {
            forward: 1,
            ..MoveIntent::neutral()
        });
        assert!(body.velocity.x.abs() < 1e-6);
        assert!((body.velocity.z - 0.15).abs() < 1e-6);

        // Quarter turn: the same key now moves along +x.
        body.apply_intent(&MoveIntent {
            forward: 1,
            camera_yaw: FRAC_PI_2,
            ..MoveIntent::neutral()
        });
        assert!((body.velocity.x - 0.15).abs() < 1e-5);
        assert!(body.velocity.z.abs() < 1e-5);
    }

    #[test]
    fn diagonal_intent_keeps_full_speed() {
        let mut body = airborne_at_origin();
        body.move_speed = 0.15;
        body.apply_intent(&MoveIntent {
            forward: 1,
            strafe: 1,
            ..MoveIntent::neutral()
        });
        let speed = (body.velocity.x * body.velocity.x + body.velocity.z * body.velocity.z).sqrt();
        assert!((speed - 0.15).abs() < 1e-6, "diagonals are normalized");
    }

    #[test]
    fn neutral_intent_preserves_slide_velocity() {
        let mut body = airborne_at_origin();
        body.velocity.x = 0.2;
        body.apply_intent(&MoveIntent::neutral());
        assert!((body.velocity.x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn jump_requires_ground() {
        let mut body = KinematicBody::new(Vec3::ZERO);
        assert!(!body.try_jump(0.3));

        body.grounded = true;
        assert!(body.try_jump(0.3));
        assert!((body.velocity.y - 0.3).abs() < 1e-6);
        assert!(!body.grounded);

        // Airborne again: no double jump.
        assert!(!body.try_jump(0.3));
    }

    #[test]
    fn pad_snap_is_bounded_in_area_and_depth() {
        let mut shallow = KinematicBody::new(Vec3::ZERO);
        shallow.position = Vec3::new(3.0, -0.4, 3.0);
        shallow.velocity.y = -0.4;
        assert!(shallow.snap_to_ground_pad());
        assert_eq!(shallow.position.y, 0.0);
        assert!(shallow.grounded);

        let mut off_pad = KinematicBody::new(Vec3::ZERO);
        off_pad.position = Vec3::new(0.0, -0.4, GROUND_PAD_HALF_EXTENT + 1.0);
        assert!(!off_pad.snap_to_ground_pad());

        let mut deep = KinematicBody::new(Vec3::ZERO);
        deep.position = Vec3::new(0.0, -5.0, 0.0);
        assert!(!deep.snap_to_ground_pad(), "deep falls are not rescued");
    }

    #[test]
    fn boost_expires_at_its_deadline() {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.boost_until = Some(100);

        body.set_move_speed(0.15, 99);
        assert!((body.move_speed - 0.15 * SPEED_BOOST_FACTOR).abs() < 1e-6);

        body.set_move_speed(0.15, 100);
        assert!((body.move_speed - 0.15).abs() < 1e-6);
        assert!(body.boost_until.is_none());
    }
}
