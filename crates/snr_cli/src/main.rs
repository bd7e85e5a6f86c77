//! Search-and-rescue CLI
//!
//! Operational tooling over the simulation core: map inspection and
//! random-policy rollouts for smoke-testing reward and observation
//! configurations before a training run.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use snr_core::{EnvConfig, ObservationKind, RewardKind, SearchRescueEnv, TileMap};

#[derive(Parser)]
#[command(name = "snr_cli")]
#[command(about = "Search-and-rescue simulation tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print tile statistics for a map bitmap
    InspectMap {
        /// Map bitmap path; uses the built-in demo map when omitted
        #[arg(long)]
        map: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Run random-policy episodes and report statistics
    Rollout {
        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: u32,

        /// Base seed; episode e uses seed + e
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Map bitmap path; uses the built-in demo map when omitted
        #[arg(long)]
        map: Option<PathBuf>,

        /// Observation mode
        #[arg(long, value_enum, default_value_t = ObsMode::Vector)]
        observation: ObsMode,

        /// Reward policy
        #[arg(long, value_enum, default_value_t = RewardMode::Shaped)]
        reward: RewardMode,

        /// Episode duration override in seconds
        #[arg(long)]
        duration: Option<f32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ObsMode {
    Vector,
    Visual,
}

impl From<ObsMode> for ObservationKind {
    fn from(mode: ObsMode) -> Self {
        match mode {
            ObsMode::Vector => ObservationKind::Vector,
            ObsMode::Visual => ObservationKind::Visual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RewardMode {
    Shaped,
    Sparse,
}

impl From<RewardMode> for RewardKind {
    fn from(mode: RewardMode) -> Self {
        match mode {
            RewardMode::Shaped => RewardKind::Shaped,
            RewardMode::Sparse => RewardKind::Sparse,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::InspectMap { map, json } => inspect_map(map, json),
        Commands::Rollout {
            episodes,
            seed,
            map,
            observation,
            reward,
            duration,
        } => rollout(episodes, seed, map, observation, reward, duration),
    }
}

fn load_map(path: Option<&PathBuf>, config: &EnvConfig) -> Result<TileMap> {
    let map = match path {
        Some(p) => TileMap::from_path(p, &config.map)?,
        None => TileMap::from_image(snr_core::map::builtin::demo_map(), &config.map)?,
    };
    Ok(map)
}

fn inspect_map(path: Option<PathBuf>, as_json: bool) -> Result<()> {
    let config = EnvConfig::default();
    let map = load_map(path.as_ref(), &config)?;

    let start = map.start_position();
    let tiles_x = map.width() / map.tile_size();
    let tiles_y = map.height() / map.tile_size();
    let traversable = map.traversable_positions().len();

    if as_json {
        let report = json!({
            "grid": { "tiles_x": tiles_x, "tiles_y": tiles_y, "tile_size": map.tile_size() },
            "traversable_tiles": traversable,
            "start": { "x": start.x, "y": start.y },
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("grid: {}x{} tiles of {} units", tiles_x, tiles_y, map.tile_size());
        println!("traversable tiles: {}", traversable);
        println!("start tile: ({}, {})", start.x, start.y);
    }
    Ok(())
}

fn rollout(
    episodes: u32,
    seed: u64,
    map: Option<PathBuf>,
    observation: ObsMode,
    reward: RewardMode,
    duration: Option<f32>,
) -> Result<()> {
    let mut config = EnvConfig {
        observation: observation.into(),
        reward: reward.into(),
        ..EnvConfig::default()
    };
    if let Some(secs) = duration {
        config.game_duration_secs = secs;
    }

    let mut env = match map {
        Some(path) => SearchRescueEnv::from_path(config, path)?,
        None => SearchRescueEnv::builtin(config)?,
    };
    let mut policy_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);

    let mut total_reward = 0.0f64;
    let mut total_steps = 0u64;
    let mut rescue_histogram = [0u32; 4];

    for episode in 0..episodes {
        env.reset(Some(seed + episode as u64));
        loop {
            let action = policy_rng.gen_range(0..env.action_count() as u8);
            let out = env.step_index(action)?;
            if out.terminated {
                break;
            }
        }

        let stats = *env.stats();
        info!(
            "episode {}: {} steps, reward {:.2}, {} rescued ({:?})",
            episode, stats.steps, stats.cumulative_reward, stats.rescued_count, stats.termination
        );
        total_reward += stats.cumulative_reward as f64;
        total_steps += stats.steps as u64;
        rescue_histogram[(stats.rescued_count as usize).min(3)] += 1;
    }

    println!("episodes:     {}", episodes);
    println!("mean reward:  {:.3}", total_reward / episodes.max(1) as f64);
    println!("mean steps:   {:.1}", total_steps as f64 / episodes.max(1) as f64);
    println!(
        "rescue counts (0/1/2/3+): {} / {} / {} / {}",
        rescue_histogram[0], rescue_histogram[1], rescue_histogram[2], rescue_histogram[3]
    );
    if let Some(best) = env.best_rescue_secs() {
        println!("fastest clear: {:.2}s", best);
    }
    Ok(())
}
