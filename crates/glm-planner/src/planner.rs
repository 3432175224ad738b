//! Hardware-aware flag planning.
//!
//! Four independent rules, applied in order, each only appending:
//!
//! 1. **Memory pressure**: model needs more than the GPU has, so quantize and
//!    offload part of the weights to host memory.
//! 2. **Mixture-of-experts**: distributed expert execution with a bounded
//!    expert cache.
//! 3. **Multi-GPU**: more than one accelerator.
//! 4. **GPU tuning**: any accelerator: size the memory pool, mixed precision.

use glm_core::{HardwareSnapshot, ModelDescriptor};

use crate::flags::FlagSet;

pub const ENABLE_QUANTIZATION: &str = "--enable-quantization";
pub const QUANTIZATION_LEVEL: &str = "--quantization-level";
pub const ENABLE_CPU_OFFLOADING: &str = "--enable-cpu-offloading";
pub const CPU_OFFLOAD_THRESHOLD: &str = "--cpu-offload-threshold";
pub const MOE_MODE: &str = "--moe-mode";
pub const MAX_EXPERTS_CACHED: &str = "--max-experts-cached";
pub const ENABLE_EXPERT_SWAPPING: &str = "--enable-expert-swapping";
pub const EXPERT_CACHE_SIZE: &str = "--expert-cache-size";
pub const MULTI_GPU: &str = "--multi-gpu";
pub const GPU_COUNT: &str = "--gpu-count";
pub const GPU_MEMORY_POOL: &str = "--gpu-memory-pool";
pub const ENABLE_MIXED_PRECISION: &str = "--enable-mixed-precision";

const PRESSURE_QUANTIZATION_LEVEL: &str = "q4";
/// Fraction of weights moved to host memory. Fixed, not derived from the deficit.
const PRESSURE_OFFLOAD_THRESHOLD: &str = "0.3";

const MOE_EXECUTION_MODE: &str = "distributed";
const MOE_MAX_CACHED_EXPERTS: u32 = 3;
const MOE_EXPERT_CACHE_SIZE: &str = "2GB";

/// True when the model does not fit in GPU memory. Always true without a GPU.
pub fn under_memory_pressure(model: &ModelDescriptor, hw: &HardwareSnapshot) -> bool {
    hw.gpu_memory_gb < model.required_memory_gb
}

/// Derive engine flags for running `model` on `hw`.
pub fn plan(model: &ModelDescriptor, hw: &HardwareSnapshot) -> FlagSet {
    let mut flags = FlagSet::new();

    if under_memory_pressure(model, hw) {
        flags
            .switch(ENABLE_QUANTIZATION)
            .set(QUANTIZATION_LEVEL, PRESSURE_QUANTIZATION_LEVEL)
            .switch(ENABLE_CPU_OFFLOADING)
            .set(CPU_OFFLOAD_THRESHOLD, PRESSURE_OFFLOAD_THRESHOLD);
    }

    if model.architecture.is_moe() {
        flags
            .set(MOE_MODE, MOE_EXECUTION_MODE)
            .set(MAX_EXPERTS_CACHED, MOE_MAX_CACHED_EXPERTS)
            .switch(ENABLE_EXPERT_SWAPPING)
            .set(EXPERT_CACHE_SIZE, MOE_EXPERT_CACHE_SIZE);
    }

    if hw.gpu_available && hw.gpu_count > 1 {
        flags.switch(MULTI_GPU).set(GPU_COUNT, hw.gpu_count);
    }

    // The pool is sized to the full GPU even when offloading fired above.
    if hw.gpu_available {
        flags
            .set(GPU_MEMORY_POOL, hw.gpu_memory_gb)
            .switch(ENABLE_MIXED_PRECISION);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use glm_core::{Architecture, ModelRegistry, MoeSpec};

    fn model(required_memory_gb: u64, architecture: Architecture) -> ModelDescriptor {
        ModelDescriptor {
            name: "test".to_string(),
            size: "1B".to_string(),
            required_memory_gb,
            quantization: "q40".to_string(),
            architecture,
            moe: architecture.is_moe().then_some(MoeSpec {
                expert_count: 16,
                active_expert_count: 2,
            }),
            source_url: "https://example.com/test.gguf".to_string(),
        }
    }

    fn gpus(count: u32, memory_gb: u64) -> HardwareSnapshot {
        HardwareSnapshot {
            gpu_available: true,
            gpu_count: count,
            gpu_memory_gb: memory_gb,
            system_memory_gb: Some(64),
            cpu_count: Some(16),
        }
    }

    const PRESSURE: [&str; 6] = [
        ENABLE_QUANTIZATION,
        QUANTIZATION_LEVEL,
        "q4",
        ENABLE_CPU_OFFLOADING,
        CPU_OFFLOAD_THRESHOLD,
        "0.3",
    ];

    const MOE: [&str; 7] = [
        MOE_MODE,
        "distributed",
        MAX_EXPERTS_CACHED,
        "3",
        ENABLE_EXPERT_SWAPPING,
        EXPERT_CACHE_SIZE,
        "2GB",
    ];

    #[test]
    fn test_moe_on_small_gpu() {
        let flags = plan(&model(13, Architecture::Intellect3), &gpus(1, 8));

        let mut expected: Vec<&str> = Vec::new();
        expected.extend(PRESSURE);
        expected.extend(MOE);
        expected.extend([GPU_MEMORY_POOL, "8", ENABLE_MIXED_PRECISION]);
        assert_eq!(flags.to_args(), expected);
        assert!(!flags.contains(MULTI_GPU));
    }

    #[test]
    fn test_dense_model_without_gpu() {
        let flags = plan(&model(3, Architecture::Glm4), &HardwareSnapshot::cpu_only());
        assert_eq!(flags.to_args(), PRESSURE);
    }

    #[test]
    fn test_pressure_flags_whenever_gpu_is_too_small() {
        for (required, gpu_mem) in [(1, 0), (7, 6), (13, 12), (200, 80)] {
            let flags = plan(&model(required, Architecture::Glm4), &gpus(1, gpu_mem));
            assert!(under_memory_pressure(&model(required, Architecture::Glm4), &gpus(1, gpu_mem)));
            assert_eq!(&flags.to_args()[..6], PRESSURE, "required={required} gpu={gpu_mem}");
        }
    }

    #[test]
    fn test_no_pressure_when_model_fits_exactly() {
        let flags = plan(&model(8, Architecture::Glm4), &gpus(1, 8));
        assert!(!flags.contains(ENABLE_QUANTIZATION));
        assert!(!flags.contains(ENABLE_CPU_OFFLOADING));
        assert_eq!(flags.to_args(), [GPU_MEMORY_POOL, "8", ENABLE_MIXED_PRECISION]);
    }

    #[test]
    fn test_moe_flags_regardless_of_hardware() {
        let snapshots = [HardwareSnapshot::cpu_only(), gpus(1, 8), gpus(4, 80)];
        for hw in &snapshots {
            let flags = plan(&model(13, Architecture::Intellect3), hw);
            let args = flags.to_args();
            let start = args.iter().position(|a| a == MOE_MODE).unwrap();
            assert_eq!(&args[start..start + 7], MOE, "hw={hw:?}");
        }
    }

    #[test]
    fn test_multi_gpu_only_above_one_device() {
        let flags = plan(&model(13, Architecture::Glm4), &gpus(4, 24));
        assert!(flags.contains(MULTI_GPU));
        assert_eq!(flags.get(GPU_COUNT), Some("4"));
        assert!(flags.position(MULTI_GPU) < flags.position(GPU_MEMORY_POOL));

        for count in [0, 1] {
            let flags = plan(&model(13, Architecture::Glm4), &gpus(count, 24));
            assert!(!flags.contains(MULTI_GPU));
            assert!(!flags.contains(GPU_COUNT));
        }
    }

    #[test]
    fn test_no_gpu_flags_without_gpu() {
        // A stale count with no GPU available must not leak through.
        let hw = HardwareSnapshot {
            gpu_count: 2,
            ..HardwareSnapshot::cpu_only()
        };
        for arch in [Architecture::Glm4, Architecture::Intellect3] {
            let flags = plan(&model(7, arch), &hw);
            assert!(!flags.contains(MULTI_GPU));
            assert!(!flags.contains(GPU_MEMORY_POOL));
            assert!(!flags.contains(ENABLE_MIXED_PRECISION));
        }
    }

    #[test]
    fn test_builtin_models_on_workstation() {
        let registry = ModelRegistry::builtin();
        let hw = gpus(2, 24);

        let dense = plan(registry.lookup("glm_4_9b_instruct_q40").unwrap(), &hw);
        assert_eq!(
            dense.to_args(),
            [MULTI_GPU, GPU_COUNT, "2", GPU_MEMORY_POOL, "24", ENABLE_MIXED_PRECISION]
        );

        let moe = plan(registry.lookup("intellect3_106b_moe_q40").unwrap(), &hw);
        assert!(!moe.contains(ENABLE_QUANTIZATION));
        assert_eq!(moe.get(MAX_EXPERTS_CACHED), Some("3"));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let m = model(13, Architecture::Intellect3);
        let hw = gpus(2, 8);
        assert_eq!(plan(&m, &hw), plan(&m, &hw));
    }
}
