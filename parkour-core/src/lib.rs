//! Deterministic core for a 3D parkour game.
//!
//! The crate owns physics, obstacle behavior, level generation, and the AI
//! racer for a fixed-timestep (60 Hz) parkour simulation. It is headless by
//! construction: a host drives [`GameSession::tick`] with a [`MoveIntent`]
//! each frame and renders from the returned [`WorldSnapshot`]. Nothing here
//! touches a clock, a thread, or an event loop, so a session is replayable
//! from a seed plus an input sequence.

pub mod constants;
pub mod error;
pub mod input;
pub mod math;
pub mod rng;
pub mod sim;

pub use error::GameError;
pub use input::MoveIntent;
pub use math::{Aabb, Vec3};
pub use rng::SeededRng;
pub use sim::{
    AiDifficulty, AiProfile, DeathCause, GameSession, HudReadout, TickEvent, WorldSnapshot,
};
