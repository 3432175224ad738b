//! `glm inference|chat|worker|benchmark`: probe, plan, and launch the engine.

use anyhow::{Result, bail};
use glm_core::{HardwareProbe, ModelCache};
use tracing::{info, warn};

use super::Context;
use crate::launch::{self, Mode};

pub fn run(ctx: &Context, probe: &dyn HardwareProbe, model_name: &str, mode: Mode) -> Result<()> {
    let argv = prepare(ctx, probe, model_name, &mode)?;

    if ctx.dry_run {
        println!("{}", argv.join(" "));
        return Ok(());
    }

    info!("running: {}", argv.join(" "));
    launch::execute(&argv)
}

/// Resolve the model, plan flags for the probed hardware, and assemble the
/// engine argv. Fetches the artifact unless this is a dry run.
fn prepare(
    ctx: &Context,
    probe: &dyn HardwareProbe,
    model_name: &str,
    mode: &Mode,
) -> Result<Vec<String>> {
    if let Mode::Worker { nodes, node_id } = mode {
        if *nodes == 0 || node_id >= nodes {
            bail!("invalid worker position: node id {node_id} of {nodes} nodes");
        }
    }

    let model = ctx.registry.lookup(model_name)?;
    let hardware = probe.probe();

    if matches!(mode, Mode::Benchmark) {
        info!("benchmarking {}", model.name);
        info!("hardware detected: {}", serde_json::to_string_pretty(&hardware)?);
    }

    if glm_planner::under_memory_pressure(model, &hardware) {
        warn!(
            "model requires {}GB, but GPU has {}GB; enabling quantization and CPU offloading",
            model.required_memory_gb, hardware.gpu_memory_gb
        );
    }

    let flags = glm_planner::plan(model, &hardware);
    if matches!(mode, Mode::Benchmark) {
        info!("planned flags: {}", serde_json::to_string(&flags)?);
    }

    let cache = ModelCache::new(&ctx.config.models_dir, &ctx.config.downloader);
    let model_path = if ctx.dry_run {
        cache.path_for(&model.name)
    } else {
        cache.ensure(model)?
    };

    Ok(launch::build_command(
        &ctx.config.engine,
        mode,
        &model_path,
        model,
        &flags,
    ))
}
