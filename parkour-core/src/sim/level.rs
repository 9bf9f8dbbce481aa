//! Level content: a few authored layouts and a seeded procedural generator
//! for everything in between.
//!
//! Generated courses climb away from the spawn pad along +z, two units up
//! and three units deeper per platform, drifting laterally as a clamped
//! random walk, with level-gated obstacle kinds. The finish block sits one
//! hop past the deepest platform, so every course ends the same way it is
//! traversed.

use crate::constants::{
    SPAWNER_BASE_INTERVAL_TICKS, SPAWNER_CAP, SPAWNER_MIN_INTERVAL_TICKS, SPAWNER_UNLOCK_LEVEL,
};
use crate::math::Vec3;
use crate::rng::SeededRng;
use crate::sim::obstacle::{Obstacle, ObstacleKind};
use crate::sim::projectile::BulletSpawner;

/// Everything a freshly loaded level contains.
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    pub obstacles: Vec<Obstacle>,
    pub spawners: Vec<BulletSpawner>,
}

/// Obstacle kinds the generator may roll, with the level they unlock at and
/// the per-platform probability once unlocked. Rolled in order; the first
/// hit wins and anything below its unlock level never consumes randomness.
const KIND_ROLLS: &[(ObstacleKind, u32, f32)] = &[
    (ObstacleKind::Glass, 3, 0.20),
    (ObstacleKind::Ice, 6, 0.18),
    (ObstacleKind::Leaves, 9, 0.16),
    (ObstacleKind::Bounce, 12, 0.14),
    (ObstacleKind::SpeedPad, 15, 0.12),
    (ObstacleKind::Sticky, 17, 0.12),
    (ObstacleKind::Phase, 20, 0.12),
];

/// The level an obstacle kind first becomes eligible, for kinds the
/// generator rolls.
pub fn kind_unlock_level(kind: ObstacleKind) -> Option<u32> {
    KIND_ROLLS
        .iter()
        .find(|(rolled, _, _)| *rolled == kind)
        .map(|(_, unlock, _)| *unlock)
}

/// Platforms in a generated course: `floor(5 + level * 0.5)`.
pub fn platform_count(level: u32) -> usize {
    5 + (level / 2) as usize
}

pub fn spawner_count(level: u32) -> usize {
    if level < SPAWNER_UNLOCK_LEVEL {
        return 0;
    }
    (1 + (level - SPAWNER_UNLOCK_LEVEL) as usize / 5).min(SPAWNER_CAP)
}

/// Turret cadence tightens three ticks per level past the unlock, down to a
/// floor.
pub fn spawner_fire_interval(level: u32) -> u64 {
    SPAWNER_BASE_INTERVAL_TICKS
        .saturating_sub(u64::from(level.saturating_sub(SPAWNER_UNLOCK_LEVEL)) * 3)
        .max(SPAWNER_MIN_INTERVAL_TICKS)
}

/// Builds the obstacle registry and turret row for `level`. Authored levels
/// come back identical every time; procedural ones are deterministic in the
/// session's RNG stream.
pub fn generate(level: u32, rng: &mut SeededRng, now: u64) -> GeneratedLevel {
    let mut obstacles = Vec::new();
    let mut next_id = 0u32;

    let finish_position = if let Some(layout) = authored_layout(level) {
        for &(kind, x, y, z) in layout {
            obstacles.push(place(&mut next_id, kind, Vec3::new(x, y, z), now));
        }
        let deepest = layout.iter().fold(Vec3::ZERO, |acc, &(_, x, y, z)| {
            if z > acc.z {
                Vec3::new(x, y, z)
            } else {
                acc
            }
        });
        finish_past(deepest)
    } else {
        tracing::trace!(level, "no authored layout, generating procedurally");
        let count = platform_count(level);
        let mut x = 0.0f32;
        let mut deepest = Vec3::ZERO;
        for i in 0..count {
            let step = i as f32;
            // The first platform stays near the center line so both spawn
            // points can make the entry hop; later ones drift.
            let drift = if i == 0 {
                rng.next_range_f32(-0.5, 0.5)
            } else {
                rng.next_range_f32(-3.0, 3.0)
            };
            x = (x + drift).clamp(-8.0, 8.0);
            let y = step * 2.0 + 1.0 + rng.next_range_f32(-0.5, 0.5);
            let z = 5.0 + step * 3.0 + rng.next_range_f32(-1.0, 1.0);
            let kind = roll_kind(level, rng);
            let position = Vec3::new(x, y, z);
            deepest = position;
            obstacles.push(place(&mut next_id, kind, position, now));
        }
        finish_past(deepest)
    };

    obstacles.push(place(
        &mut next_id,
        ObstacleKind::Finish,
        finish_position,
        now,
    ));

    let spawners = build_spawners(level, now);
    GeneratedLevel {
        obstacles,
        spawners,
    }
}

/// One hop past the deepest platform, pulled toward the center line. A
/// four unit gap with a one unit climb fits every flight arc from the hard
/// tier up.
fn finish_past(deepest: Vec3) -> Vec3 {
    Vec3::new(deepest.x.clamp(-2.0, 2.0), deepest.y + 1.0, deepest.z + 4.0)
}

fn place(next_id: &mut u32, kind: ObstacleKind, position: Vec3, now: u64) -> Obstacle {
    let id = *next_id;
    *next_id += 1;
    let obstacle = Obstacle::new(id, kind, position, now);
    if kind == ObstacleKind::Cannon {
        // Cannons rake the course from the sidelines toward the center line.
        let aim = if position.x == 0.0 {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::new(-position.x.signum(), 0.0, 0.0)
        };
        return obstacle.with_fire_dir(aim);
    }
    obstacle
}

fn roll_kind(level: u32, rng: &mut SeededRng) -> ObstacleKind {
    for &(kind, unlock, probability) in KIND_ROLLS {
        if level >= unlock && rng.chance(probability) {
            return kind;
        }
    }
    ObstacleKind::Platform
}

fn build_spawners(level: u32, now: u64) -> Vec<BulletSpawner> {
    let interval = spawner_fire_interval(level);
    (0..spawner_count(level))
        .map(|i| {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let position = Vec3::new(12.0 * side, 4.0 + i as f32 * 3.0, 12.0 + i as f32 * 8.0);
            BulletSpawner::new(position, Vec3::new(-side, 0.0, 0.0), interval, now)
        })
        .collect()
}

type Entry = (ObstacleKind, f32, f32, f32);

fn authored_layout(level: u32) -> Option<&'static [Entry]> {
    match level {
        1 => Some(LEVEL_1),
        2 => Some(LEVEL_2),
        10 => Some(LEVEL_10),
        25 => Some(LEVEL_25),
        50 => Some(LEVEL_50),
        _ => None,
    }
}

// Tutorial staircase. Nothing but plain platforms.
const LEVEL_1: &[Entry] = &[
    (ObstacleKind::Platform, 0.0, 1.0, 4.0),
    (ObstacleKind::Platform, 1.0, 2.0, 7.0),
    (ObstacleKind::Platform, -1.0, 3.0, 10.0),
    (ObstacleKind::Platform, 0.0, 4.0, 13.0),
    (ObstacleKind::Platform, 1.0, 5.0, 16.0),
];

// Glass introduction: every other step punishes a hard landing.
const LEVEL_2: &[Entry] = &[
    (ObstacleKind::Platform, 0.0, 1.0, 5.0),
    (ObstacleKind::Glass, 1.0, 2.0, 8.0),
    (ObstacleKind::Platform, -1.0, 3.0, 11.0),
    (ObstacleKind::Glass, 0.0, 4.0, 14.0),
    (ObstacleKind::Platform, 1.0, 5.0, 17.0),
    (ObstacleKind::Platform, 0.0, 6.0, 20.0),
];

// Slides and crumbling canopies, with a spike trap beside the route.
const LEVEL_10: &[Entry] = &[
    (ObstacleKind::Platform, 0.0, 1.0, 5.0),
    (ObstacleKind::Ice, 1.0, 2.0, 8.0),
    (ObstacleKind::Ice, -1.0, 3.0, 11.0),
    (ObstacleKind::Leaves, 0.0, 4.0, 14.0),
    (ObstacleKind::Spike, 3.0, 4.0, 14.0),
    (ObstacleKind::Ice, 1.0, 5.0, 17.0),
    (ObstacleKind::Leaves, -1.0, 6.0, 20.0),
    (ObstacleKind::Platform, 0.0, 7.0, 23.0),
];

// Momentum playground: pads, a bounce launch, sticky perches, and the first
// authored cannon covering them.
const LEVEL_25: &[Entry] = &[
    (ObstacleKind::Platform, 0.0, 1.0, 5.0),
    (ObstacleKind::SpeedPad, 1.0, 2.0, 8.0),
    (ObstacleKind::Bounce, -1.0, 2.5, 11.0),
    (ObstacleKind::Platform, 0.0, 5.0, 15.0),
    (ObstacleKind::Sticky, 1.5, 6.0, 18.0),
    (ObstacleKind::Cannon, -6.0, 6.5, 18.0),
    (ObstacleKind::SpeedPad, 0.0, 7.0, 21.0),
    (ObstacleKind::Platform, -1.0, 8.0, 24.0),
    (ObstacleKind::Spike, 2.0, 8.0, 24.0),
    (ObstacleKind::Platform, 0.5, 9.0, 27.0),
];

// Finale gauntlet: one of everything, twice where it hurts.
const LEVEL_50: &[Entry] = &[
    (ObstacleKind::Platform, 0.0, 1.0, 5.0),
    (ObstacleKind::Ice, 1.0, 2.0, 8.0),
    (ObstacleKind::Glass, -1.0, 3.0, 11.0),
    (ObstacleKind::Leaves, 0.0, 4.0, 14.0),
    (ObstacleKind::Bounce, 1.0, 4.5, 17.0),
    (ObstacleKind::Platform, 0.0, 7.0, 21.0),
    (ObstacleKind::Spike, -2.5, 7.0, 21.0),
    (ObstacleKind::Phase, -1.0, 8.0, 24.0),
    (ObstacleKind::Sticky, 0.0, 9.0, 27.0),
    (ObstacleKind::Cannon, -7.0, 9.5, 27.0),
    (ObstacleKind::SpeedPad, 1.0, 10.0, 30.0),
    (ObstacleKind::Glass, 0.0, 11.0, 33.0),
    (ObstacleKind::Phase, -1.0, 12.0, 36.0),
    (ObstacleKind::Platform, 0.0, 13.0, 39.0),
    (ObstacleKind::Spike, 2.5, 13.0, 39.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn finish_count(level: &GeneratedLevel) -> usize {
        level
            .obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::Finish)
            .count()
    }

    #[test]
    fn authored_levels_are_stable() {
        let mut rng_a = SeededRng::new(1);
        let mut rng_b = SeededRng::new(999);
        let a = generate(1, &mut rng_a, 0);
        let b = generate(1, &mut rng_b, 0);

        assert_eq!(a.obstacles.len(), LEVEL_1.len() + 1);
        for (lhs, rhs) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(lhs.kind, rhs.kind);
            assert_eq!(lhs.position, rhs.position);
        }
    }

    #[test]
    fn every_level_has_exactly_one_finish() {
        let mut rng = SeededRng::new(42);
        for level in 1..=50 {
            let generated = generate(level, &mut rng, 0);
            assert_eq!(finish_count(&generated), 1, "level {level}");
        }
    }

    #[test]
    fn finish_sits_past_the_deepest_platform() {
        let mut rng = SeededRng::new(7);
        for level in [1, 3, 10, 31, 50] {
            let generated = generate(level, &mut rng, 0);
            let finish = generated
                .obstacles
                .iter()
                .find(|o| o.kind == ObstacleKind::Finish)
                .expect("finish exists");
            let deepest_other = generated
                .obstacles
                .iter()
                .filter(|o| o.kind != ObstacleKind::Finish)
                .map(|o| o.position.z)
                .fold(f32::MIN, f32::max);
            assert!(finish.position.z > deepest_other, "level {level}");
        }
    }

    #[test]
    fn platform_count_follows_the_half_level_ramp() {
        assert_eq!(platform_count(1), 5);
        assert_eq!(platform_count(2), 6);
        assert_eq!(platform_count(3), 6);
        assert_eq!(platform_count(20), 15);
        assert_eq!(platform_count(49), 29);
    }

    #[test]
    fn procedural_platforms_climb_monotonically() {
        let mut rng = SeededRng::new(0xC0FFEE);
        let generated = generate(7, &mut rng, 0);
        let steps: Vec<&Obstacle> = generated
            .obstacles
            .iter()
            .filter(|o| o.kind != ObstacleKind::Finish)
            .collect();
        for pair in steps.windows(2) {
            assert!(pair[1].position.z > pair[0].position.z);
            assert!(pair[1].position.y > pair[0].position.y);
        }
        for step in steps {
            assert!((-8.0..=8.0).contains(&step.position.x));
        }
    }

    #[test]
    fn procedural_courses_fit_the_top_flight_arc() {
        use crate::constants::GRAVITY;
        use crate::sim::ai::{hop_reach, AiDifficulty, AiProfile};

        let profile = AiProfile::for_difficulty(AiDifficulty::Perfect);
        for seed in [2u32, 11, 77, 901, 4242] {
            let mut rng = SeededRng::new(seed);
            for level in [4, 8, 23, 41] {
                let generated = generate(level, &mut rng, 0);
                let mut route: Vec<&Obstacle> = generated
                    .obstacles
                    .iter()
                    .filter(|o| o.kind.is_landable() || o.kind == ObstacleKind::Finish)
                    .collect();
                route.sort_by(|a, b| a.position.z.total_cmp(&b.position.z));

                // Walk the course from the racer spawn; every consecutive
                // hop must fit the arc or the course is not finishable.
                let mut standing = Vec3::new(2.0, 0.0, 0.0);
                for obstacle in route {
                    let rise = obstacle.top() + 0.5 - standing.y;
                    let gap = standing.horizontal_distance(obstacle.position);
                    let reach =
                        hop_reach(profile.move_speed, profile.jump_force, GRAVITY, rise);
                    assert!(
                        reach.is_some_and(|r| gap <= r),
                        "seed {seed} level {level}: hop to {:?} rise {rise} gap {gap}",
                        obstacle.position,
                    );
                    standing =
                        Vec3::new(obstacle.position.x, obstacle.top() + 0.5, obstacle.position.z);
                }
            }
        }
    }

    #[test]
    fn locked_kinds_never_appear_early() {
        // Level 5: only glass is unlocked, so across many seeds nothing
        // beyond glass may show up.
        for seed in 1..40u32 {
            let mut rng = SeededRng::new(seed);
            let generated = generate(5, &mut rng, 0);
            for obstacle in &generated.obstacles {
                assert!(
                    matches!(
                        obstacle.kind,
                        ObstacleKind::Platform | ObstacleKind::Glass | ObstacleKind::Finish
                    ),
                    "seed {seed} produced {:?}",
                    obstacle.kind
                );
            }
        }
    }

    #[test]
    fn unlock_table_matches_kind_queries() {
        assert_eq!(kind_unlock_level(ObstacleKind::Glass), Some(3));
        assert_eq!(kind_unlock_level(ObstacleKind::Phase), Some(20));
        assert_eq!(kind_unlock_level(ObstacleKind::Platform), None);
        assert_eq!(kind_unlock_level(ObstacleKind::Spike), None);
    }

    #[test]
    fn spawners_gate_on_level_and_scale_up() {
        assert_eq!(spawner_count(29), 0);
        assert_eq!(spawner_count(30), 1);
        assert_eq!(spawner_count(35), 2);
        assert_eq!(spawner_count(45), 4);
        assert_eq!(spawner_count(50), 4, "capped");

        assert_eq!(spawner_fire_interval(30), 120);
        assert_eq!(spawner_fire_interval(40), 90);
        assert!(spawner_fire_interval(50) >= SPAWNER_MIN_INTERVAL_TICKS);

        let mut rng = SeededRng::new(3);
        let low = generate(12, &mut rng, 0);
        assert!(low.spawners.is_empty());
        let high = generate(34, &mut rng, 0);
        assert_eq!(high.spawners.len(), 1);
    }

    #[test]
    fn same_seed_same_procedural_layout() {
        let mut rng_a = SeededRng::new(555);
        let mut rng_b = SeededRng::new(555);
        let a = generate(23, &mut rng_a, 0);
        let b = generate(23, &mut rng_b, 0);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        for (lhs, rhs) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(lhs.kind, rhs.kind);
            assert_eq!(lhs.position, rhs.position);
        }
    }
}
