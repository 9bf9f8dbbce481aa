//! Small parsing helpers shared by the CLI surfaces.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Parse a seed written either as decimal or as `0x`-prefixed hex.
pub fn parse_seed(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed '{text}'"))
    } else {
        trimmed
            .parse::<u32>()
            .with_context(|| format!("invalid seed '{text}'"))
    }
}

/// Canonical display form for seeds in filenames and reports.
pub fn seed_to_hex(seed: u32) -> String {
    format!("0x{seed:08x}")
}

/// Parse a comma-separated seed list, deduplicating while keeping order.
pub fn parse_seed_csv(text: &str) -> Result<Vec<u32>> {
    let mut seeds = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let seed = parse_seed(part)?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("no seeds in '{text}'");
    }
    Ok(seeds)
}

/// Read seeds from a file, one per line. Blank lines and `#` comments are
/// skipped.
pub fn parse_seed_file(path: &Path) -> Result<Vec<u32>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let mut seeds = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let seed = parse_seed(line)?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("seed file {} has no seeds", path.display());
    }
    Ok(seeds)
}

/// Parse a level selection such as `1,3,10-12`. Ranges are inclusive.
pub fn parse_level_list(text: &str) -> Result<Vec<u32>> {
    let mut levels = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((lo, hi)) = part.split_once('-') {
            let lo: u32 = lo
                .trim()
                .parse()
                .with_context(|| format!("invalid level range '{part}'"))?;
            let hi: u32 = hi
                .trim()
                .parse()
                .with_context(|| format!("invalid level range '{part}'"))?;
            if lo > hi {
                bail!("level range '{part}' runs backwards");
            }
            for level in lo..=hi {
                if !levels.contains(&level) {
                    levels.push(level);
                }
            }
        } else {
            let level: u32 = part
                .parse()
                .with_context(|| format!("invalid level '{part}'"))?;
            if !levels.contains(&level) {
                levels.push(level);
            }
        }
    }
    if levels.is_empty() {
        bail!("no levels in '{text}'");
    }
    Ok(levels)
}
