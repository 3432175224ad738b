//! Hardware probing.
//!
//! Every sub-probe is optional. A missing `nvidia-smi` or unreadable
//! `/proc/meminfo` degrades to "no GPU" / unknown instead of failing.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use crate::types::HardwareSnapshot;

/// Source of hardware snapshots.
pub trait HardwareProbe {
    fn probe(&self) -> HardwareSnapshot;
}

/// Probe that always reports the snapshot it was built with.
#[derive(Debug, Clone)]
pub struct StaticProbe(pub HardwareSnapshot);

impl HardwareProbe for StaticProbe {
    fn probe(&self) -> HardwareSnapshot {
        self.0.clone()
    }
}

/// Probe backed by the host: `nvidia-smi` for GPUs, `/proc/meminfo` for
/// system memory, and the scheduler's view of available parallelism.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    nvidia_smi: String,
    meminfo: PathBuf,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self {
            nvidia_smi: "nvidia-smi".to_string(),
            meminfo: PathBuf::from("/proc/meminfo"),
        }
    }
}

/// Accelerators visible to the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GpuInfo {
    count: u32,
    /// Memory of the first device.
    memory_gb: u64,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn probe_gpus(&self) -> Option<GpuInfo> {
        let output = Command::new(&self.nvidia_smi)
            .args(["--query-gpu=memory.total", "--format=csv,noheader,nounits"])
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let info = parse_nvidia_smi(&String::from_utf8_lossy(&out.stdout));
                if info.is_none() {
                    info!("nvidia-smi reported no GPUs");
                }
                info
            }
            Ok(out) => {
                info!(status = ?out.status, "nvidia-smi failed, GPU detection skipped");
                None
            }
            Err(e) => {
                info!("nvidia-smi not available, GPU detection skipped: {e}");
                None
            }
        }
    }

    fn probe_system_memory(&self) -> Option<u64> {
        match std::fs::read_to_string(&self.meminfo) {
            Ok(content) => parse_meminfo_total_gb(&content),
            Err(e) => {
                info!("cannot read {}: {e}", self.meminfo.display());
                None
            }
        }
    }
}

impl HardwareProbe for SystemProbe {
    fn probe(&self) -> HardwareSnapshot {
        let gpu = self.probe_gpus();
        let snapshot = HardwareSnapshot {
            gpu_available: gpu.is_some(),
            gpu_count: gpu.map_or(0, |g| g.count),
            gpu_memory_gb: gpu.map_or(0, |g| g.memory_gb),
            system_memory_gb: self.probe_system_memory(),
            cpu_count: std::thread::available_parallelism().ok().map(|n| n.get()),
        };
        debug!(?snapshot, "hardware probed");
        snapshot
    }
}

/// Parse `nvidia-smi --query-gpu=memory.total --format=csv,noheader,nounits`.
///
/// One line per device, each a MiB figure.
fn parse_nvidia_smi(output: &str) -> Option<GpuInfo> {
    let sizes: Vec<u64> = output
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect();

    let first = *sizes.first()?;
    Some(GpuInfo {
        count: sizes.len() as u32,
        memory_gb: first / 1024,
    })
}

/// Extract `MemTotal` (kB) from `/proc/meminfo` as whole gigabytes.
fn parse_meminfo_total_gb(meminfo: &str) -> Option<u64> {
    let kb: u64 = meminfo
        .lines()
        .find(|line| line.starts_with("MemTotal:"))?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()?;
    Some(kb / (1024 * 1024))
}
