use glm_core::ModelRegistry;

pub fn list(registry: &ModelRegistry) -> anyhow::Result<()> {
    println!("Available GLM models:");
    println!("{}", "-".repeat(50));

    for model in registry.iter() {
        println!("Model: {}", model.name);
        println!("  Size: {}", model.size);
        println!("  Architecture: {}", model.architecture);
        println!("  Memory Required: {}GB", model.required_memory_gb);
        if let Some(moe) = &model.moe {
            println!("  MoE Experts: {}", moe.expert_count);
            println!("  Active Experts: {}", moe.active_expert_count);
        }
        println!("  Download URL: {}", model.source_url);
        println!();
    }

    Ok(())
}
