//! AABB collision resolution for movers against the obstacle registry.
//!
//! Landing versus side contact is decided by the axis of least overlap: a
//! contact is a landing only when the mover is descending, its bottom is
//! near the obstacle's top, and the y overlap is the smallest of the three.
//! Everything else is a lateral push along the smaller horizontal axis.

use crate::constants::{
    BASE_MOVE_SPEED, BOUNCE_KICK, GLASS_BREAK_SPEED, ICE_ACCELERATION, ICE_SPEED_CAP,
    LANDING_TOLERANCE, LEAVES_SUPPORT_TICKS, PLATFORM_FRICTION, SPEED_BOOST_TICKS,
};
use crate::sim::body::KinematicBody;
use crate::sim::obstacle::{Obstacle, ObstacleKind};

/// The single event a resolution pass may trigger, in priority order.
/// A spike contact dominates everything and ends the pass immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Spiked,
    Finished,
    Bounced,
}

/// Outcome of resolving one body for one tick.
#[derive(Debug, Default)]
pub struct Resolution {
    pub event: Option<SurfaceEvent>,
    /// Glass obstacles shattered during the pass; already marked dead.
    pub shattered: Vec<u32>,
}

/// Resolves `body` against every live, solid obstacle, mutating position and
/// velocity in place. `modifier_held` suppresses landing friction so sprint
/// momentum carries across platforms.
pub fn resolve_collisions(
    body: &mut KinematicBody,
    obstacles: &mut [Obstacle],
    jump_force: f32,
    modifier_held: bool,
    now: u64,
) -> Resolution {
    let mut resolution = Resolution::default();

    for obstacle in obstacles.iter_mut() {
        if !obstacle.alive || !obstacle.solid {
            continue;
        }
        // Recompute the mover box every iteration: earlier contacts in the
        // pass may have moved the body.
        let Some(overlap) = body.aabb().overlap(&obstacle.aabb()) else {
            continue;
        };

        if obstacle.kind == ObstacleKind::Spike {
            resolution.event = Some(SurfaceEvent::Spiked);
            return resolution;
        }
        if obstacle.kind == ObstacleKind::Finish && resolution.event.is_none() {
            resolution.event = Some(SurfaceEvent::Finished);
        }

        let y_smallest = overlap.y <= overlap.x && overlap.y <= overlap.z;
        let descending = body.velocity.y <= 0.0;
        let near_top = body.bottom() >= obstacle.top() - LANDING_TOLERANCE;

        if y_smallest && descending && near_top {
            land(body, obstacle, jump_force, modifier_held, now, &mut resolution);
        } else {
            push_aside(body, obstacle, overlap.x, overlap.z);
        }
    }

    resolution
}

/// Snaps the body onto the obstacle's top face and applies the surface's
/// landing behavior. Glass is special: a hard impact shatters it instead of
/// supporting the landing, and the body keeps falling.
fn land(
    body: &mut KinematicBody,
    obstacle: &mut Obstacle,
    jump_force: f32,
    modifier_held: bool,
    now: u64,
    resolution: &mut Resolution,
) {
    if obstacle.kind == ObstacleKind::Glass && body.velocity.y < -GLASS_BREAK_SPEED {
        obstacle.alive = false;
        resolution.shattered.push(obstacle.id);
        return;
    }

    body.position.y = obstacle.top() + body.half_extents.y;
    body.velocity.y = 0.0;
    body.grounded = true;

    match obstacle.kind {
        ObstacleKind::Platform
        | ObstacleKind::Glass
        | ObstacleKind::Phase
        | ObstacleKind::Cannon => {
            if !modifier_held {
                body.velocity.x *= PLATFORM_FRICTION;
                body.velocity.z *= PLATFORM_FRICTION;
            }
        }
        ObstacleKind::Ice => {
            body.velocity.x *= ICE_ACCELERATION;
            body.velocity.z *= ICE_ACCELERATION;
            let cap = BASE_MOVE_SPEED * ICE_SPEED_CAP;
            let speed = (body.velocity.x * body.velocity.x
                + body.velocity.z * body.velocity.z)
                .sqrt();
            if speed > cap {
                let scale = cap / speed;
                body.velocity.x *= scale;
                body.velocity.z *= scale;
            }
            body.move_speed = (body.move_speed * ICE_ACCELERATION).min(cap);
        }
        ObstacleKind::Leaves => {
            // First contact arms the crumble deadline; later landings while
            // the canopy still holds must not push it out.
            if obstacle.crumble_at.is_none() && obstacle.restore_at.is_none() {
                obstacle.crumble_at = Some(now + LEAVES_SUPPORT_TICKS);
            }
        }
        ObstacleKind::Bounce => {
            body.velocity.y = jump_force + BOUNCE_KICK;
            body.grounded = false;
            if resolution.event.is_none() {
                resolution.event = Some(SurfaceEvent::Bounced);
            }
        }
        ObstacleKind::SpeedPad => {
            body.boost_until = Some(now + SPEED_BOOST_TICKS);
        }
        ObstacleKind::Sticky => {
            if obstacle.climbable {
                body.velocity.x *= 0.5;
                body.velocity.z *= 0.5;
            }
        }
        // Completion was already recorded; the finish block otherwise
        // behaves as a plain surface. Spikes never reach here.
        ObstacleKind::Spike | ObstacleKind::Finish => {}
    }
}

/// Pushes the body out along the smaller horizontal overlap, away from the
/// obstacle's center, and kills the velocity component that drove it in.
fn push_aside(body: &mut KinematicBody, obstacle: &Obstacle, overlap_x: f32, overlap_z: f32) {
    if overlap_x <= overlap_z {
        let dir = if body.position.x >= obstacle.position.x {
            1.0
        } else {
            -1.0
        };
        body.position.x += overlap_x * dir;
        body.velocity.x = 0.0;
    } else {
        let dir = if body.position.z >= obstacle.position.z {
            1.0
        } else {
            -1.0
        };
        body.position.z += overlap_z * dir;
        body.velocity.z = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{JUMP_FORCE, SPEED_BOOST_TICKS};
    use crate::math::Vec3;

    fn body_at(position: Vec3) -> KinematicBody {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.position = position;
        body
    }

    fn one(kind: ObstacleKind, position: Vec3) -> Vec<Obstacle> {
        vec![Obstacle::new(0, kind, position, 0)]
    }

    #[test]
    fn falling_body_lands_on_platform_top() {
        // Platform at (0, 1, 5): top face at y = 1.25.
        let mut obstacles = one(ObstacleKind::Platform, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.3;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);

        assert!(res.event.is_none());
        assert!((body.position.y - 1.75).abs() < 1e-6);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.grounded);
    }

    #[test]
    fn landing_resolution_is_idempotent() {
        let mut obstacles = one(ObstacleKind::Platform, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.3;

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        let settled = body.position;
        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert_eq!(body.position, settled);
    }

    #[test]
    fn least_overlap_axis_decides_classification() {
        // Overlaps engineered to x = 0.2, y = 0.05, z = 0.3 against a
        // platform at the origin: y wins, so this is a landing.
        let obstacle = Obstacle::new(0, ObstacleKind::Platform, Vec3::ZERO, 0);
        let mut obstacles = vec![obstacle];
        let mut body = body_at(Vec3::new(1.3, 0.7, 1.2));
        body.velocity.y = -0.1;

        let mover = body.aabb();
        let depth = mover.overlap(&obstacles[0].aabb()).expect("overlapping");
        assert!((depth.x - 0.2).abs() < 1e-6);
        assert!((depth.y - 0.05).abs() < 1e-6);
        assert!((depth.z - 0.3).abs() < 1e-6);

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert!(body.grounded, "smallest y overlap classifies as landing");

        // Same box but rising: landing is off the table, and the push must
        // use x (0.2), not z (0.3).
        let mut riser = body_at(Vec3::new(1.3, 0.7, 1.2));
        riser.velocity.y = 0.1;
        let before_z = riser.position.z;
        resolve_collisions(&mut riser, &mut obstacles, JUMP_FORCE, false, 0);
        assert!(!riser.grounded);
        assert!((riser.position.x - 1.5).abs() < 1e-6, "pushed out along +x");
        assert_eq!(riser.position.z, before_z);
        assert_eq!(riser.velocity.x, 0.0);
    }

    #[test]
    fn side_push_moves_away_from_center_and_zeroes_axis() {
        let mut obstacles = one(ObstacleKind::Platform, Vec3::new(0.0, 1.0, 5.0));
        // Approaching from -z, overlapping the near face, too low to land.
        let mut body = body_at(Vec3::new(0.0, 1.0, 3.7));
        body.velocity.z = 0.15;

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);

        assert!(body.position.z < 3.7, "pushed back toward -z");
        assert_eq!(body.velocity.z, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn fast_fall_shatters_glass_without_landing() {
        let mut obstacles = one(ObstacleKind::Glass, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.5;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);

        assert_eq!(res.shattered, vec![0]);
        assert!(!obstacles[0].alive);
        assert!(!body.grounded, "no landing on shattered glass");
        assert!((body.velocity.y + 0.5).abs() < 1e-6, "fall continues");
    }

    #[test]
    fn gentle_fall_lands_on_glass() {
        let mut obstacles = one(ObstacleKind::Glass, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.6, 5.0));
        body.velocity.y = -0.1;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);

        assert!(res.shattered.is_empty());
        assert!(obstacles[0].alive);
        assert!(body.grounded);
    }

    #[test]
    fn bounce_pad_launches_above_jump_force() {
        let mut obstacles = one(ObstacleKind::Bounce, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.2;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);

        assert_eq!(res.event, Some(SurfaceEvent::Bounced));
        assert!((body.velocity.y - (JUMP_FORCE + BOUNCE_KICK)).abs() < 1e-6);
        assert!(!body.grounded, "bounce leaves the body airborne");
    }

    #[test]
    fn ice_accelerates_up_to_the_cap() {
        let mut obstacles = one(ObstacleKind::Ice, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity = Vec3::new(0.0, -0.1, 0.15);

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert!((body.velocity.z - 0.15 * ICE_ACCELERATION).abs() < 1e-6);

        // Repeated landings approach but never exceed the cap.
        let cap = BASE_MOVE_SPEED * ICE_SPEED_CAP;
        for tick in 1..200 {
            body.position = Vec3::new(0.0, 1.5, 5.0);
            body.velocity.y = -0.1;
            resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, tick);
        }
        assert!(body.velocity.z <= cap + 1e-6);
        assert!(body.velocity.z > cap - 1e-3);
    }

    #[test]
    fn speed_pad_arms_a_boost_deadline() {
        let mut obstacles = one(ObstacleKind::SpeedPad, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.1;

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 40);
        assert_eq!(body.boost_until, Some(40 + SPEED_BOOST_TICKS));
    }

    #[test]
    fn climbable_sticky_halves_horizontal_velocity() {
        let mut obstacles = one(ObstacleKind::Sticky, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity = Vec3::new(0.1, -0.1, 0.15);

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert!((body.velocity.x - 0.05).abs() < 1e-6);
        assert!((body.velocity.z - 0.075).abs() < 1e-6);
        assert!(body.grounded);

        // Non-climbable sticky grips without damping.
        let mut plain = Obstacle::new(1, ObstacleKind::Sticky, Vec3::new(0.0, 1.0, 5.0), 0);
        plain.climbable = false;
        let mut obstacles = vec![plain];
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity = Vec3::new(0.1, -0.1, 0.15);
        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert!((body.velocity.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn leaves_arm_crumble_once() {
        let mut obstacles = one(ObstacleKind::Leaves, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.1;

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 10);
        assert_eq!(obstacles[0].crumble_at, Some(10 + LEAVES_SUPPORT_TICKS));

        // A second landing does not refresh the deadline.
        body.position = Vec3::new(0.0, 1.5, 5.0);
        body.velocity.y = -0.1;
        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 20);
        assert_eq!(obstacles[0].crumble_at, Some(10 + LEAVES_SUPPORT_TICKS));
    }

    #[test]
    fn spike_contact_dominates_everything() {
        let mut obstacles = vec![
            Obstacle::new(0, ObstacleKind::Spike, Vec3::new(0.0, 1.0, 5.0), 0),
            Obstacle::new(1, ObstacleKind::Platform, Vec3::new(0.0, 1.0, 5.0), 0),
        ];
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.1;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert_eq!(res.event, Some(SurfaceEvent::Spiked));
        assert!(!body.grounded, "resolution stops at the spike");
    }

    #[test]
    fn finish_triggers_from_any_contact_side() {
        // Side contact, not a landing, still completes.
        let mut obstacles = one(ObstacleKind::Finish, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.0, 3.7));
        body.velocity.z = 0.15;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert_eq!(res.event, Some(SurfaceEvent::Finished));
    }

    #[test]
    fn sprint_modifier_skips_landing_friction() {
        let mut obstacles = one(ObstacleKind::Platform, Vec3::new(0.0, 1.0, 5.0));
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity = Vec3::new(0.0, -0.1, 0.27);

        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, true, 0);
        assert!((body.velocity.z - 0.27).abs() < 1e-6);

        body.position = Vec3::new(0.0, 1.5, 5.0);
        body.velocity = Vec3::new(0.0, -0.1, 0.27);
        resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert!((body.velocity.z - 0.27 * PLATFORM_FRICTION).abs() < 1e-6);
    }

    #[test]
    fn dead_and_phased_out_obstacles_are_ignored() {
        let mut obstacles = one(ObstacleKind::Platform, Vec3::new(0.0, 1.0, 5.0));
        obstacles[0].solid = false;
        let mut body = body_at(Vec3::new(0.0, 1.5, 5.0));
        body.velocity.y = -0.3;

        let res = resolve_collisions(&mut body, &mut obstacles, JUMP_FORCE, false, 0);
        assert!(res.event.is_none());
        assert!(!body.grounded);
        assert!((body.position.y - 1.5).abs() < 1e-6, "falls straight through");
    }
}
