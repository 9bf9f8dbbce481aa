//! Difficulty ladder benchmark.
//!
//! Fans a grid of difficulty x level x seed races out over a rayon pool,
//! then ranks the tiers by a configurable objective and writes the whole
//! run set to disk (`runs.csv`, `rankings.csv`, `summary.json`).

use crate::profiles::parse_difficulty;
use crate::runner::{run_race, ticks_to_secs, RunMetrics};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use parkour_core::AiDifficulty;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Completion,
    Speed,
    Hybrid,
}

impl Objective {
    pub fn run_value(self, metrics: &RunMetrics) -> f64 {
        let finish_bonus = if metrics.finished { 1.0 } else { 0.0 };
        let time_secs = metrics
            .finish_secs
            .map(f64::from)
            .unwrap_or_else(|| f64::from(ticks_to_secs(metrics.max_ticks)));
        match self {
            Self::Completion => {
                finish_bonus * 1000.0 + (metrics.furthest_z as f64) * 2.0
                    - (metrics.deaths as f64) * 25.0
            }
            Self::Speed => {
                finish_bonus * 400.0 - time_secs * 12.0 + (metrics.furthest_z as f64) * 0.5
            }
            Self::Hybrid => {
                finish_bonus * 700.0 + (metrics.furthest_z as f64) * 1.5
                    - time_secs * 4.0
                    - (metrics.deaths as f64) * 40.0
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Speed => "speed",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub difficulties: Vec<AiDifficulty>,
    pub levels: Vec<u32>,
    pub seeds: Vec<u32>,
    pub max_ticks: u64,
    pub objective: Objective,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub difficulty: String,
    pub level: u32,
    pub seed: u32,
    pub seed_hex: String,
    pub ticks: u64,
    pub finished: bool,
    pub finish_secs: Option<f32>,
    pub deaths: u32,
    pub void_deaths: u32,
    pub spike_deaths: u32,
    pub bullet_deaths: u32,
    pub holding_ticks: u64,
    pub furthest_z: f32,
    pub objective_value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifficultyAggregate {
    pub difficulty: String,
    pub runs: usize,
    pub finish_rate: f64,
    /// Mean finish time over the runs that finished. Absent when none did.
    pub avg_finish_secs: Option<f64>,
    pub avg_deaths: f64,
    pub avg_holding_ticks: f64,
    pub avg_furthest_z: f64,
    pub max_furthest_z: f64,
    pub objective_value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub objective: Objective,
    pub max_ticks: u64,
    pub jobs: Option<usize>,
    pub difficulties: Vec<AiDifficulty>,
    pub levels: Vec<u32>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub difficulty_rankings: Vec<DifficultyAggregate>,
    pub runs: Vec<RunRecord>,
}

#[derive(Clone, Debug)]
struct InternalRun {
    metrics: RunMetrics,
    objective_value: f64,
}

pub fn resolve_difficulties(input: Option<&str>) -> Result<Vec<AiDifficulty>> {
    match input {
        None => Ok(AiDifficulty::ALL.to_vec()),
        Some(raw) => {
            let mut difficulties = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                let difficulty = parse_difficulty(token)?;
                if !difficulties.contains(&difficulty) {
                    difficulties.push(difficulty);
                }
            }
            if difficulties.is_empty() {
                return Err(anyhow!("--difficulties resolved to empty list"));
            }
            Ok(difficulties)
        }
    }
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.levels.is_empty() {
        return Err(anyhow!("benchmark requires at least one level"));
    }
    if config.difficulties.is_empty() {
        return Err(anyhow!("benchmark requires at least one difficulty"));
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }

    let levels = &config.levels;
    let seeds = &config.seeds;
    let run_jobs: Vec<(AiDifficulty, u32, u32)> = config
        .difficulties
        .iter()
        .flat_map(|difficulty| {
            levels.iter().flat_map(move |level| {
                seeds
                    .iter()
                    .map(move |seed| (*difficulty, *level, *seed))
            })
        })
        .collect();

    let run_one = |&(difficulty, level, seed): &(AiDifficulty, u32, u32)| -> Result<InternalRun> {
        let metrics = run_race(difficulty, level, seed, config.max_ticks).with_context(|| {
            format!("benchmark run failed for difficulty={difficulty} level={level} seed={seed:#x}")
        })?;
        let objective_value = config.objective.run_value(&metrics);
        Ok(InternalRun {
            metrics,
            objective_value,
        })
    };

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let mut grouped: HashMap<String, Vec<&InternalRun>> = HashMap::new();
    for run in &runs {
        grouped
            .entry(run.metrics.difficulty.clone())
            .or_default()
            .push(run);
    }

    let mut rankings = Vec::new();
    for (difficulty, tier_runs) in grouped {
        let runs_count = tier_runs.len();
        let finished_count = tier_runs.iter().filter(|r| r.metrics.finished).count();
        let sum_finish_secs: f64 = tier_runs
            .iter()
            .filter_map(|r| r.metrics.finish_secs)
            .map(f64::from)
            .sum();
        let sum_deaths: u64 = tier_runs.iter().map(|r| r.metrics.deaths as u64).sum();
        let sum_holding: u64 = tier_runs.iter().map(|r| r.metrics.holding_ticks).sum();
        let sum_furthest: f64 = tier_runs
            .iter()
            .map(|r| r.metrics.furthest_z as f64)
            .sum();
        let max_furthest = tier_runs
            .iter()
            .map(|r| r.metrics.furthest_z as f64)
            .fold(0.0f64, f64::max);
        let objective_value =
            tier_runs.iter().map(|r| r.objective_value).sum::<f64>() / runs_count as f64;

        rankings.push(DifficultyAggregate {
            difficulty,
            runs: runs_count,
            finish_rate: finished_count as f64 / runs_count as f64,
            avg_finish_secs: (finished_count > 0)
                .then(|| sum_finish_secs / finished_count as f64),
            avg_deaths: sum_deaths as f64 / runs_count as f64,
            avg_holding_ticks: sum_holding as f64 / runs_count as f64,
            avg_furthest_z: sum_furthest / runs_count as f64,
            max_furthest_z: max_furthest,
            objective_value,
        });
    }

    rankings.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.finish_rate.total_cmp(&a.finish_rate))
            .then_with(|| b.avg_furthest_z.total_cmp(&a.avg_furthest_z))
    });

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|run| RunRecord {
            difficulty: run.metrics.difficulty.clone(),
            level: run.metrics.level,
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            ticks: run.metrics.ticks,
            finished: run.metrics.finished,
            finish_secs: run.metrics.finish_secs,
            deaths: run.metrics.deaths,
            void_deaths: run.metrics.void_deaths,
            spike_deaths: run.metrics.spike_deaths,
            bullet_deaths: run.metrics.bullet_deaths,
            holding_ticks: run.metrics.holding_ticks,
            furthest_z: run.metrics.furthest_z,
            objective_value: run.objective_value,
        })
        .collect();

    run_records.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.finished.cmp(&a.finished))
            .then_with(|| a.ticks.cmp(&b.ticks))
    });

    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &rankings)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        objective: config.objective,
        max_ticks: config.max_ticks,
        jobs: config.jobs,
        difficulties: config.difficulties,
        levels: config.levels,
        seeds: config.seeds,
        run_count: run_records.len(),
        difficulty_rankings: rankings,
        runs: run_records,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "difficulty,level,seed_hex,seed,ticks,finished,finish_secs,deaths,void_deaths,spike_deaths,bullet_deaths,holding_ticks,furthest_z,objective_value\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{:.2},{:.4}\n",
            row.difficulty,
            row.level,
            row.seed_hex,
            row.seed,
            row.ticks,
            row.finished,
            row.finish_secs
                .map(|secs| format!("{secs:.2}"))
                .unwrap_or_default(),
            row.deaths,
            row.void_deaths,
            row.spike_deaths,
            row.bullet_deaths,
            row.holding_ticks,
            row.furthest_z,
            row.objective_value
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rows: &[DifficultyAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,difficulty,runs,finish_rate,avg_finish_secs,avg_deaths,avg_holding_ticks,avg_furthest_z,max_furthest_z,objective_value\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{:.4},{},{:.2},{:.1},{:.2},{:.2},{:.4}\n",
            idx + 1,
            row.difficulty,
            row.runs,
            row.finish_rate,
            row.avg_finish_secs
                .map(|secs| format!("{secs:.2}"))
                .unwrap_or_default(),
            row.avg_deaths,
            row.avg_holding_ticks,
            row.avg_furthest_z,
            row.max_furthest_z,
            row.objective_value
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(finished: bool, finish_secs: Option<f32>, furthest_z: f32) -> RunMetrics {
        RunMetrics {
            difficulty: "perfect".to_string(),
            level: 1,
            seed: 1,
            max_ticks: 1_200,
            ticks: if finished { 400 } else { 1_200 },
            finished,
            finish_secs,
            deaths: 0,
            void_deaths: 0,
            spike_deaths: 0,
            bullet_deaths: 0,
            holding_ticks: 0,
            furthest_z,
        }
    }

    #[test]
    fn every_objective_prefers_a_finish() {
        let done = metrics(true, Some(6.5), 20.0);
        let stuck = metrics(false, None, 9.0);
        for objective in [Objective::Completion, Objective::Speed, Objective::Hybrid] {
            assert!(
                objective.run_value(&done) > objective.run_value(&stuck),
                "{} scored a stuck run above a finish",
                objective.as_str()
            );
        }
    }

    #[test]
    fn speed_objective_rewards_the_faster_finish() {
        let quick = metrics(true, Some(5.0), 20.0);
        let slow = metrics(true, Some(11.0), 20.0);
        assert!(Objective::Speed.run_value(&quick) > Objective::Speed.run_value(&slow));
    }

    #[test]
    fn difficulty_resolution_defaults_to_the_whole_roster() {
        let all = resolve_difficulties(None).unwrap();
        assert_eq!(all.len(), 5);
        let picked = resolve_difficulties(Some("perfect, easy,perfect")).unwrap();
        assert_eq!(picked, vec![AiDifficulty::Perfect, AiDifficulty::Easy]);
        assert!(resolve_difficulties(Some("nightmare")).is_err());
        assert!(resolve_difficulties(Some(" , ")).is_err());
    }

    #[test]
    fn empty_grids_are_rejected_before_any_run() {
        let config = BenchmarkConfig {
            difficulties: vec![AiDifficulty::Perfect],
            levels: vec![1],
            seeds: Vec::new(),
            max_ticks: 100,
            objective: Objective::Completion,
            out_dir: PathBuf::from("/nonexistent-benchmark-out"),
            jobs: None,
        };
        assert!(run_benchmark(config).is_err());
    }
}
