use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use parkour_autopilot::benchmark::{
    resolve_difficulties, run_benchmark, BenchmarkConfig, Objective,
};
use parkour_autopilot::profiles::{describe_profiles, parse_difficulty};
use parkour_autopilot::runner::run_race;
use parkour_autopilot::util::{
    parse_level_list, parse_seed, parse_seed_csv, parse_seed_file, seed_to_hex,
};
use parkour_core::GameSession;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "parkour-autopilot")]
#[command(about = "Headless race harness for the deterministic parkour core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the AI difficulty roster
    ListProfiles,
    /// Race one difficulty over one level and print its metrics
    Run {
        #[arg(long, default_value = "perfect")]
        difficulty: String,
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value = "0x5EED")]
        seed: String,
        #[arg(long, default_value_t = 18_000)]
        max_ticks: u64,
        /// Write the full metrics record as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Race a difficulty x level x seed grid and rank the tiers
    Benchmark {
        #[arg(long)]
        difficulties: Option<String>,
        /// Level selection, e.g. `1,3,10-12`
        #[arg(long, default_value = "1")]
        levels: String,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 18_000)]
        max_ticks: u64,
        #[arg(long, value_enum, default_value_t = CliObjective::Completion)]
        objective: CliObjective,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Generate a level deterministically and dump its layout
    InspectLevel {
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value = "0x5EED")]
        seed: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliObjective {
    Completion,
    Speed,
    Hybrid,
}

impl From<CliObjective> for Objective {
    fn from(value: CliObjective) -> Self {
        match value {
            CliObjective::Completion => Objective::Completion,
            CliObjective::Speed => Objective::Speed,
            CliObjective::Hybrid => Objective::Hybrid,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::ListProfiles => {
            for (id, description) in describe_profiles() {
                println!("{id:10} {description}");
            }
        }
        Commands::Run {
            difficulty,
            level,
            seed,
            max_ticks,
            output,
        } => {
            let difficulty = parse_difficulty(&difficulty)?;
            let seed = parse_seed(&seed)?;
            let metrics = run_race(difficulty, level, seed, max_ticks)?;

            println!("difficulty={}", metrics.difficulty);
            println!("level={}", metrics.level);
            println!("seed={}", seed_to_hex(metrics.seed));
            println!("ticks={}", metrics.ticks);
            println!("finished={}", metrics.finished);
            println!(
                "finish_secs={}",
                metrics
                    .finish_secs
                    .map(|secs| format!("{secs:.2}"))
                    .unwrap_or_else(|| "none".to_string())
            );
            println!("deaths={}", metrics.deaths);
            println!(
                "death_causes=void:{},spike:{},bullet:{}",
                metrics.void_deaths, metrics.spike_deaths, metrics.bullet_deaths
            );
            println!("holding_ticks={}", metrics.holding_ticks);
            println!("furthest_z={:.2}", metrics.furthest_z);

            if let Some(path) = output {
                let encoded = serde_json::to_vec_pretty(&metrics)?;
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)?;
                println!("output={}", path.display());
            }
        }
        Commands::Benchmark {
            difficulties,
            levels,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            max_ticks,
            objective,
            out_dir,
            jobs,
        } => {
            let difficulties = resolve_difficulties(difficulties.as_deref())?;
            let levels = parse_level_list(&levels)?;
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let objective: Objective = objective.into();

            let out_dir = out_dir.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "benchmarks/{}-{}",
                    objective.as_str(),
                    timestamp_suffix()
                ))
            });

            let report = run_benchmark(BenchmarkConfig {
                difficulties,
                levels,
                seeds,
                max_ticks,
                objective,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!("objective={}", objective.as_str());
            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            println!("tier rankings:");
            for (idx, tier) in report.difficulty_rankings.iter().enumerate() {
                println!(
                    "  {}. {}  objective={:.2} finish_rate={:.0}% avg_finish={} avg_deaths={:.2} avg_furthest_z={:.1}",
                    idx + 1,
                    tier.difficulty,
                    tier.objective_value,
                    tier.finish_rate * 100.0,
                    tier.avg_finish_secs
                        .map(|secs| format!("{secs:.2}s"))
                        .unwrap_or_else(|| "none".to_string()),
                    tier.avg_deaths,
                    tier.avg_furthest_z,
                );
            }
        }
        Commands::InspectLevel {
            level,
            seed,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let mut session = GameSession::new(seed);
            session.start_game();
            session.load_level(level)?;
            let snapshot = session.snapshot();

            let layout = serde_json::json!({
                "level": snapshot.level,
                "seed": seed_to_hex(seed),
                "obstacles": snapshot.obstacles,
                "spawners": snapshot.spawners,
                "finish_position": snapshot.finish_position,
            });
            let encoded = serde_json::to_vec_pretty(&layout)?;

            if let Some(path) = output {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, encoded)?;
                println!("level={level}");
                println!("seed={}", seed_to_hex(seed));
                println!("obstacles={}", snapshot.obstacles.len());
                println!("spawners={}", snapshot.spawners.len());
                println!("output={}", path.display());
            } else {
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
    }

    Ok(())
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }

    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }

    let start = if let Some(start) = seed_start {
        parse_seed(start)?
    } else {
        0x504B_0001
    };

    let mut out = Vec::with_capacity(seed_count as usize);
    let mut cur = start;
    for _ in 0..seed_count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    Ok(out)
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
