//! MDP Playground CLI
//!
//! Runs generated toy environments from JSON configs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ndarray::{ArrayD, IxDyn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use mdp_playground::env::{Env, EpisodeStats};
use mdp_playground::log::{ConsoleLogger, MetricLogger, NoOpLogger};
use mdp_playground_envs::config::MdpKind;
use mdp_playground_envs::{ToyEnv, ToyEnvConfig};

#[derive(Parser)]
#[command(name = "mdpp")]
#[command(
    version,
    about = "MDP Playground - toy environments with tunable difficulty",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Sample uniformly from the action space
    Random,
    /// Repeat `--action` every step
    Constant,
}

#[derive(Subcommand)]
enum Commands {
    /// Run episodes of a toy environment
    Run {
        /// JSON config file
        #[arg(long)]
        config: PathBuf,

        /// Number of episodes
        #[arg(long, default_value = "1")]
        episodes: u64,

        /// Action policy
        #[arg(long, value_enum, default_value = "random")]
        policy: Policy,

        /// Action value used by the constant policy
        #[arg(long, default_value = "0")]
        action: f32,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Skip per-episode metric lines, print only the summary
        #[arg(long)]
        quiet: bool,
    },

    /// Validate a config and describe the generated environment
    Describe {
        /// JSON config file
        #[arg(long)]
        config: PathBuf,
    },

    /// Print the default config
    Defaults {
        /// Continuous instead of discrete defaults
        #[arg(long)]
        continuous: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            episodes,
            policy,
            action,
            seed,
            quiet,
        } => {
            run(&config, episodes, policy, action, seed, quiet)?;
        }
        Commands::Describe { config } => {
            describe(&config)?;
        }
        Commands::Defaults { continuous } => {
            let config = if continuous {
                ToyEnvConfig::continuous_defaults()
            } else {
                ToyEnvConfig::discrete_defaults()
            };
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ToyEnvConfig> {
    ToyEnvConfig::from_json_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn run(
    path: &Path,
    episodes: u64,
    policy: Policy,
    action: f32,
    seed: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let mut config = load_config(path)?;
    if seed.is_some() {
        config.seed = seed;
    }
    let toy = ToyEnv::new(config)?;
    let env_seed = toy.current_seed();
    tracing::info!(
        config = %path.display(),
        episodes,
        policy = ?policy,
        seed = env_seed,
        "Starting run"
    );

    let mut env = EpisodeStats::new(toy);
    let action_space = env.action_space();
    let constant = ArrayD::from_elem(IxDyn(&action_space.shape()), action);
    if policy == Policy::Constant && !action_space.contains(&constant) {
        anyhow::bail!(
            "constant action {} is outside the {} action space",
            action,
            action_space.kind()
        );
    }
    // Policy randomness is kept apart from every environment stream
    let mut rng = ChaCha8Rng::seed_from_u64(env_seed.wrapping_add(1));
    let logger: Box<dyn MetricLogger> = if quiet {
        Box::new(NoOpLogger)
    } else {
        Box::new(ConsoleLogger::new())
    };

    let mut total_return = 0.0;
    let mut total_length = 0.0;
    for episode in 0..episodes {
        env.reset(None)?;
        loop {
            let a = match policy {
                Policy::Random => action_space.sample(&mut rng),
                Policy::Constant => constant.clone(),
            };
            let result = env.step(&a)?;
            if result.done() {
                logger.log_info(&result.info, episode);
                total_return += result.info.episode_return.unwrap_or(0.0);
                total_length += result.info.episode_length.unwrap_or(0.0);
                break;
            }
        }
    }
    logger.close();

    if episodes > 0 {
        println!(
            "Episodes: {}, mean return: {:.4}, mean length: {:.1}",
            episodes,
            total_return / episodes as f64,
            total_length / episodes as f64
        );
    }
    Ok(())
}

fn describe(path: &Path) -> Result<()> {
    let env = ToyEnv::new(load_config(path)?)?;
    let spec = env.spec();

    match &spec.kind {
        MdpKind::Discrete(d) => {
            println!("Discrete toy MDP");
            println!("  states:           {}", d.state_space_size);
            println!("  actions:          {}", d.action_space_size);
            println!("  terminal states:  {:?}", env.terminal_states());
            println!("  transition noise: {}", d.transition_noise);
            if let Some((states, actions)) = d.irrelevant {
                println!("  irrelevant MDP:   {} states, {} actions", states, actions);
            }
            if let Some(image) = &d.image {
                println!(
                    "  image:            {}x{} {:?}",
                    image.width, image.height, image.transforms
                );
            }
        }
        MdpKind::Continuous(c) => {
            println!("Continuous toy MDP");
            println!(
                "  dimensions:       {} (+{} irrelevant)",
                c.state_space_dim, c.irrelevant_dims
            );
            println!("  dynamics order:   {}", c.transition_dynamics_order);
            println!("  time unit:        {}", c.time_unit);
            println!("  reward function:  {:?}", c.reward_function);
            println!("  target:           {:?} (radius {})", c.target_point, c.target_radius);
        }
    }

    let observation = env.observation_space();
    let action = env.action_space();
    println!("  observation:      {} {:?}", observation.kind(), observation.shape());
    println!("  action:           {} {:?}", action.kind(), action.shape());
    println!("  horizon:          {}", spec.horizon);
    println!("  sequence length:  {}", spec.sequence_length);
    println!("  seed:             {}", spec.seed);
    println!(
        "  reward:           delay {}, density {}, scale {}, shift {}",
        spec.reward.delay, spec.reward.density, spec.reward.scale, spec.reward.shift
    );
    Ok(())
}
