//! Engine command assembly and execution.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use glm_core::ModelDescriptor;
use glm_planner::FlagSet;

/// Prompts run by `benchmark`.
const BENCHMARK_TEST_PROMPTS: u32 = 10;

/// What the engine is asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Inference {
        prompt: Option<String>,
        max_tokens: u32,
        temperature: f32,
    },
    Chat {
        temperature: f32,
    },
    Worker {
        nodes: u32,
        node_id: u32,
    },
    Benchmark,
}

impl Mode {
    pub fn subcommand(&self) -> &'static str {
        match self {
            Mode::Inference { .. } => "inference",
            Mode::Chat { .. } => "chat",
            Mode::Worker { .. } => "worker",
            Mode::Benchmark => "benchmark",
        }
    }
}

/// Build the full engine argv.
///
/// Always `<engine> <mode> --model <path> --architecture <arch>`, followed by
/// the mode's own flags and the planner output. Worker and benchmark flags
/// precede the planner output; inference and chat options follow it.
pub fn build_command(
    engine: &str,
    mode: &Mode,
    model_path: &Path,
    model: &ModelDescriptor,
    flags: &FlagSet,
) -> Vec<String> {
    let mut argv = vec![
        engine.to_string(),
        mode.subcommand().to_string(),
        "--model".to_string(),
        model_path.display().to_string(),
        "--architecture".to_string(),
        model.architecture.to_string(),
    ];

    match mode {
        Mode::Inference {
            prompt,
            max_tokens,
            temperature,
        } => {
            argv.extend(flags.to_args());
            if let Some(prompt) = prompt {
                argv.push("--prompt".to_string());
                argv.push(prompt.clone());
            }
            // Zero means "engine default" and is not forwarded.
            if *max_tokens != 0 {
                argv.push("--max-tokens".to_string());
                argv.push(max_tokens.to_string());
            }
            push_temperature(&mut argv, *temperature);
        }
        Mode::Chat { temperature } => {
            argv.extend(flags.to_args());
            push_temperature(&mut argv, *temperature);
        }
        Mode::Worker { nodes, node_id } => {
            if *nodes > 1 {
                argv.push("--distributed".to_string());
                argv.push("--nodes".to_string());
                argv.push(nodes.to_string());
                argv.push("--node-id".to_string());
                argv.push(node_id.to_string());
            }
            argv.extend(flags.to_args());
        }
        Mode::Benchmark => {
            argv.push("--test-prompts".to_string());
            argv.push(BENCHMARK_TEST_PROMPTS.to_string());
            argv.extend(flags.to_args());
        }
    }

    argv
}

fn push_temperature(argv: &mut Vec<String>, temperature: f32) {
    if temperature != 0.0 {
        argv.push("--temperature".to_string());
        argv.push(temperature.to_string());
    }
}

/// Run `argv` with inherited stdio and fail on a non-zero exit.
pub fn execute(argv: &[String]) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        bail!("empty engine command");
    };

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute '{program}'. Is the inference engine installed?"))?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        bail!("{program} exited with code {code}");
    }

    Ok(())
}
