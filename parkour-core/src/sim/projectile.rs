use crate::constants::{
    BULLET_CULL_RADIUS, BULLET_HIT_RADIUS, BULLET_SPEED, CANNON_FIRE_INTERVAL_TICKS,
};
use crate::math::Vec3;
use crate::sim::body::KinematicBody;
use crate::sim::obstacle::{Obstacle, ObstacleKind};

/// A bullet in flight. Bullets fly straight and remember where they were
/// fired from so range culling is measured from the muzzle, not the origin
/// of the world.
#[derive(Clone, Debug)]
pub struct Bullet {
    pub position: Vec3,
    pub velocity: Vec3,
    pub origin: Vec3,
    pub alive: bool,
}

impl Bullet {
    pub fn fired_from(origin: Vec3, direction: Vec3) -> Self {
        Self {
            position: origin,
            velocity: direction.normalized().scale(BULLET_SPEED),
            origin,
            alive: true,
        }
    }
}

/// A free-standing turret placed by the level generator on high levels.
/// Fires on an absolute tick deadline like every other timed thing here.
#[derive(Clone, Debug)]
pub struct BulletSpawner {
    pub position: Vec3,
    pub direction: Vec3,
    pub fire_interval: u64,
    pub next_fire: u64,
}

impl BulletSpawner {
    pub fn new(position: Vec3, direction: Vec3, fire_interval: u64, now: u64) -> Self {
        Self {
            position,
            direction: direction.normalized(),
            fire_interval,
            next_fire: now + fire_interval,
        }
    }
}

/// Which movers took a hit this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectileImpacts {
    pub player_hit: bool,
    pub ai_hit: bool,
}

/// One projectile step: advance every bullet, test proximity against both
/// movers, prune spent bullets, then let due spawners fire. A bullet spawned
/// this tick does not move or hit until the next one.
pub fn tick_projectiles(
    bullets: &mut Vec<Bullet>,
    spawners: &mut [BulletSpawner],
    player: &KinematicBody,
    ai: Option<&KinematicBody>,
    now: u64,
) -> ProjectileImpacts {
    let mut impacts = ProjectileImpacts::default();

    for bullet in bullets.iter_mut() {
        bullet.position += bullet.velocity;

        if bullet.position.distance(player.position) < BULLET_HIT_RADIUS {
            impacts.player_hit = true;
            bullet.alive = false;
            continue;
        }
        if let Some(ai_body) = ai {
            if bullet.position.distance(ai_body.position) < BULLET_HIT_RADIUS {
                impacts.ai_hit = true;
                bullet.alive = false;
                continue;
            }
        }
        if bullet.position.distance(bullet.origin) > BULLET_CULL_RADIUS {
            bullet.alive = false;
        }
    }
    bullets.retain(|bullet| bullet.alive);

    for spawner in spawners.iter_mut() {
        if now >= spawner.next_fire {
            bullets.push(Bullet::fired_from(spawner.position, spawner.direction));
            spawner.next_fire = now + spawner.fire_interval;
        }
    }

    impacts
}

/// Lets cannon obstacles with a due fire deadline shoot. Cannons removed
/// from the registry never reach here, so their timers die with them.
pub fn fire_cannons(obstacles: &mut [Obstacle], bullets: &mut Vec<Bullet>, now: u64) {
    for obstacle in obstacles.iter_mut() {
        if obstacle.kind != ObstacleKind::Cannon || !obstacle.alive {
            continue;
        }
        if let Some(at) = obstacle.fire_at {
            if now >= at {
                bullets.push(Bullet::fired_from(obstacle.position, obstacle.fire_dir));
                obstacle.fire_at = Some(now + CANNON_FIRE_INTERVAL_TICKS);
            }
        }
    }
}
