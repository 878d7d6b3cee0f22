//! MPE CLI
//!
//! Command-line interface for running the cooperative navigation scenario
//! and plotting training logs.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use mpe::env::{EpisodeStats, MultiAgentEnv};
use mpe::log::{CompositeLogger, ConsoleLogger, JsonLinesLogger, MetricLogger};
use mpe_scenarios::{
    BlendForm, IndividualForm, RewardMode, ScenarioConfig, SharedForm, SimpleSpread,
};

mod logparse;
mod plot;

#[derive(Parser)]
#[command(name = "mpe")]
#[command(version, about = "MPE - Cooperative navigation reward regimes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available reward modes
    List,

    /// Demo: run the scenario and render the world
    Demo {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Number of steps
        #[arg(long, default_value = "50")]
        steps: usize,

        /// Render every N steps
        #[arg(long, default_value = "5")]
        render_every: usize,
    },

    /// Evaluate a random policy under a reward mode
    Eval {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: usize,

        /// Also write per-episode metrics as JSON lines to this file
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },

    /// Plot reward and entropy curves from a training log
    PlotLog {
        /// Path to the log file
        #[arg(long)]
        log_file: PathBuf,

        /// Label used in the output file name
        #[arg(long)]
        reward_type: String,

        /// Directory the PNG is written to
        #[arg(long, default_value = "logging")]
        out_dir: PathBuf,
    },
}

/// Scenario selection shared by `demo` and `eval`
#[derive(Args, Debug)]
struct ScenarioArgs {
    /// JSON scenario configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reward mode: individual, shared, partially_shared, original
    #[arg(long)]
    reward_type: Option<RewardMode>,

    /// Individual formula: ideal_band, min_distance_sum
    #[arg(long)]
    individual_form: Option<IndividualForm>,

    /// Shared formula: progress, snapshot
    #[arg(long)]
    shared_form: Option<SharedForm>,

    /// Partially shared blend: progress_coverage, even_snapshot
    #[arg(long)]
    blend: Option<BlendForm>,

    /// Number of agents
    #[arg(long)]
    agents: Option<usize>,

    /// Number of landmarks
    #[arg(long)]
    landmarks: Option<usize>,

    /// Steps per episode
    #[arg(long)]
    episode_length: Option<usize>,

    /// Give every agent the mean team reward
    #[arg(long)]
    collaborative: bool,

    /// RNG seed
    #[arg(long, default_value = "42")]
    seed: u64,
}

impl ScenarioArgs {
    fn build(&self) -> Result<ScenarioConfig> {
        let mut config = match &self.config {
            Some(path) => ScenarioConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ScenarioConfig::default(),
        };

        if let Some(mode) = self.reward_type {
            config.reward.mode = mode;
        }
        if let Some(form) = self.individual_form {
            config.reward.individual_form = form;
        }
        if let Some(form) = self.shared_form {
            config.reward.shared_form = form;
        }
        if let Some(blend) = self.blend {
            config.reward.blend = blend;
        }
        if let Some(n) = self.agents {
            config.num_agents = n;
        }
        if let Some(n) = self.landmarks {
            config.num_landmarks = n;
        }
        if let Some(n) = self.episode_length {
            config.episode_length = n;
        }
        config.collaborative |= self.collaborative;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            list_modes();
        }
        Commands::Demo {
            scenario,
            steps,
            render_every,
        } => {
            demo(&scenario, steps, render_every)?;
        }
        Commands::Eval {
            scenario,
            episodes,
            metrics_out,
        } => {
            eval(&scenario, episodes, metrics_out)?;
        }
        Commands::PlotLog {
            log_file,
            reward_type,
            out_dir,
        } => {
            plot_log(&log_file, &reward_type, &out_dir)?;
        }
    }

    Ok(())
}

fn list_modes() {
    println!("Available reward modes:");
    println!();
    for mode in RewardMode::ALL {
        println!("  {:<18} {}", mode.as_str(), mode.describe());
    }
    println!();
    println!("Variants:");
    println!("  --individual-form  ideal_band (default), min_distance_sum");
    println!("  --shared-form      progress (default), snapshot");
    println!("  --blend            progress_coverage (default), even_snapshot");
}

fn random_actions(env: &impl MultiAgentEnv, rng: &mut ChaCha8Rng) -> Vec<ndarray::ArrayD<f32>> {
    (0..env.num_agents())
        .map(|i| env.action_space(i).sample(rng))
        .collect()
}

fn demo(args: &ScenarioArgs, steps: usize, render_every: usize) -> Result<()> {
    let config = args.build()?;
    tracing::info!(mode = %config.reward.mode, steps, "Running demo");

    let mut env = SimpleSpread::with_seed(config, args.seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    env.reset(Some(args.seed));

    let every = render_every.max(1);
    for step in 0..steps {
        let actions = random_actions(&env, &mut rng);
        let result = env.step(&actions)?;

        if step % every == 0 {
            if let Some(render) = env.render() {
                println!(
                    "Step {}: rewards={:?} team={:.3}\n{}",
                    step,
                    result.rewards,
                    result.total_reward(),
                    render
                );
            }
        }

        if result.done() {
            tracing::info!(step, "Episode ended, resetting");
            env.reset(None);
        }
    }

    Ok(())
}

fn eval(args: &ScenarioArgs, episodes: usize, metrics_out: Option<PathBuf>) -> Result<()> {
    if episodes == 0 {
        bail!("--episodes must be at least 1");
    }
    let config = args.build()?;
    let mode = config.reward.mode;
    tracing::info!(
        mode = %mode,
        agents = config.num_agents,
        landmarks = config.num_landmarks,
        episodes,
        "Starting evaluation (random policy)"
    );

    let mut logger = CompositeLogger::default();
    logger.add(Box::new(ConsoleLogger::with_label(mode.as_str())));
    if let Some(path) = &metrics_out {
        logger.add(Box::new(JsonLinesLogger::create(path)?));
    }

    let mut env = EpisodeStats::new(SimpleSpread::with_seed(config, args.seed)?);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut total_return = 0.0;

    for ep in 0..episodes {
        env.reset(Some(args.seed.wrapping_add(ep as u64)));
        let mut collisions = 0.0;

        let (result, steps) = loop {
            let actions = random_actions(&env, &mut rng);
            let result = env.step(&actions)?;
            collisions += result.info.get("collisions").unwrap_or(0.0) as f64;
            if result.done() {
                break (result, env.inner().tick());
            }
        };

        let benchmark = env.inner().benchmark();
        let episode_return = result.info.get("episode_return").unwrap_or(0.0) as f64;
        total_return += episode_return;

        let mut metrics = HashMap::new();
        metrics.insert("episode_return".to_string(), episode_return);
        metrics.insert("episode_length".to_string(), steps as f64);
        metrics.insert("collisions".to_string(), collisions);
        metrics.insert(
            "coverage".to_string(),
            result.info.get("coverage").unwrap_or(0.0) as f64,
        );
        metrics.insert(
            "min_dists".to_string(),
            benchmark.first().map(|b| b.min_dists).unwrap_or(0.0),
        );
        metrics.insert(
            "occupied_landmarks".to_string(),
            benchmark.first().map(|b| b.occupied_landmarks as f64).unwrap_or(0.0),
        );
        logger.log_metrics(&metrics, ep as u64);
    }

    logger.close();
    let avg_return = total_return / episodes as f64;
    tracing::info!(avg_return, "Evaluation complete");

    Ok(())
}

fn plot_log(log_file: &Path, label: &str, out_dir: &Path) -> Result<()> {
    let text = std::fs::read_to_string(log_file)
        .with_context(|| format!("reading log {}", log_file.display()))?;

    let series = logparse::LogParser::new()?.parse(&text);
    if series.is_empty() {
        tracing::warn!(log = %log_file.display(), "No training blocks found");
    }

    let path = plot::save(&series, out_dir, label)?;
    tracing::info!(
        blocks = series.len(),
        evals = series.eval_rewards.len(),
        path = %path.display(),
        "Saved chart"
    );
    println!("{}", path.display());

    Ok(())
}
