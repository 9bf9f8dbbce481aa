//! Difficulty roster for the CLI.
//!
//! Descriptions are formatted from the live tuning profiles so the listing
//! can never drift out of sync with the simulation.

use anyhow::{anyhow, Result};
use parkour_core::{AiDifficulty, AiProfile};

/// Stable identifiers accepted everywhere a difficulty is named on the
/// command line.
pub fn difficulty_ids() -> Vec<&'static str> {
    AiDifficulty::ALL.iter().map(|d| d.as_str()).collect()
}

pub fn parse_difficulty(id: &str) -> Result<AiDifficulty> {
    let wanted = id.trim().to_ascii_lowercase();
    AiDifficulty::ALL
        .into_iter()
        .find(|d| d.as_str() == wanted)
        .ok_or_else(|| {
            anyhow!(
                "unknown difficulty '{}' (expected one of: {})",
                id,
                difficulty_ids().join(", ")
            )
        })
}

/// One `(id, summary)` pair per tier.
pub fn describe_profiles() -> Vec<(String, String)> {
    AiDifficulty::ALL
        .iter()
        .map(|&difficulty| {
            let profile = AiProfile::for_difficulty(difficulty);
            let summary = format!(
                "speed {:.2}/tick, jump {:.2}, replans every {} tick(s), {:.0}% stumble chance",
                profile.move_speed,
                profile.jump_force,
                profile.reaction_ticks.max(1),
                profile.error_rate * 100.0
            );
            (difficulty.as_str().to_string(), summary)
        })
        .collect()
}
