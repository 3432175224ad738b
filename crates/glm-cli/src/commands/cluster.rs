use glm_cluster::{ClusterLayout, bootstrap};

use super::Context;

pub fn setup_cluster(ctx: &Context, model_name: &str, nodes: &[String]) -> anyhow::Result<()> {
    let layout = ClusterLayout::new(&ctx.config.models_dir, &ctx.config.worker_entry);
    let (descriptor, scripts) = bootstrap(&ctx.registry, model_name, nodes, &layout)?;

    println!("✓ Cluster configuration: {}", layout.descriptor_path().display());
    println!("  Model: {} ({})", descriptor.model, descriptor.architecture);
    for script in &scripts {
        println!("  Node {} ({}): {}", script.node_id, script.address, script.path.display());
    }

    Ok(())
}
