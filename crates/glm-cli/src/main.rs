use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glm_core::{LauncherConfig, SystemProbe};

mod commands;
mod launch;

use commands::Context;
use launch::Mode;

#[derive(Parser)]
#[command(
    name = "glm",
    about = "GLM distributed launcher: hardware-aware runs of GLM-4 and INTELLECT-3 models",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to glm.toml (default: <models_dir>/glm.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the engine command instead of downloading and running
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available models
    List,
    /// Run model inference
    Inference {
        /// Model name
        model: String,
        /// Prompt for inference
        #[arg(long)]
        prompt: Option<String>,
        /// Max tokens to generate
        #[arg(long, default_value = "100")]
        max_tokens: u32,
        /// Generation temperature
        #[arg(long, default_value = "0.7")]
        temperature: f32,
    },
    /// Run an interactive chat
    Chat {
        model: String,
        #[arg(long, default_value = "0.7")]
        temperature: f32,
    },
    /// Run a worker node for distributed inference
    Worker {
        model: String,
        /// Total nodes in the cluster
        #[arg(long, default_value = "1")]
        nodes: u32,
        /// This node's id (0-based)
        #[arg(long, default_value = "0")]
        node_id: u32,
    },
    /// Benchmark model performance on this machine
    Benchmark {
        model: String,
    },
    /// Write a cluster descriptor and per-node startup scripts.
    ///
    /// Files are written to models_dir. Copy each start_node_<i>.sh to the
    /// matching node and run it there.
    SetupCluster {
        model: String,
        /// Node addresses, in node-id order
        #[arg(long, num_args = 1..)]
        nodes: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("warn,glm=info,glm_core=info,glm_cluster=info")
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = LauncherConfig::load(cli.config.as_deref())?;
    let ctx = Context::new(config, cli.dry_run);
    let probe = SystemProbe::new();

    match cli.command {
        Commands::List => commands::list::list(&ctx.registry),
        Commands::Inference {
            model,
            prompt,
            max_tokens,
            temperature,
        } => commands::run::run(
            &ctx,
            &probe,
            &model,
            Mode::Inference {
                prompt,
                max_tokens,
                temperature,
            },
        ),
        Commands::Chat { model, temperature } => {
            commands::run::run(&ctx, &probe, &model, Mode::Chat { temperature })
        }
        Commands::Worker {
            model,
            nodes,
            node_id,
        } => commands::run::run(&ctx, &probe, &model, Mode::Worker { nodes, node_id }),
        Commands::Benchmark { model } => {
            commands::run::run(&ctx, &probe, &model, Mode::Benchmark)
        }
        Commands::SetupCluster { model, nodes } => {
            commands::cluster::setup_cluster(&ctx, &model, &nodes)
        }
    }
}
