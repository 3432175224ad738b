//! Shared types used across GLM launcher crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Model architecture understood by the inference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    /// Dense GLM-4 family.
    #[serde(rename = "glm_4")]
    Glm4,
    /// INTELLECT-3 mixture-of-experts.
    #[serde(rename = "intellect_3")]
    Intellect3,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Glm4 => "glm_4",
            Architecture::Intellect3 => "intellect_3",
        }
    }

    pub fn is_moe(&self) -> bool {
        matches!(self, Architecture::Intellect3)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mixture-of-experts shape of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoeSpec {
    pub expert_count: u32,
    pub active_expert_count: u32,
}

/// A registry entry describing one downloadable model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Parameter-count label, e.g. `"9B"`.
    pub size: String,
    pub required_memory_gb: u64,
    pub quantization: String,
    pub architecture: Architecture,
    #[serde(default)]
    pub moe: Option<MoeSpec>,
    pub source_url: String,
}

/// Point-in-time view of the local machine.
///
/// GPU fields collapse to `false`/`0` when no accelerator could be
/// enumerated. `None` means the value could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    pub gpu_available: bool,
    pub gpu_count: u32,
    pub gpu_memory_gb: u64,
    pub system_memory_gb: Option<u64>,
    pub cpu_count: Option<usize>,
}

impl HardwareSnapshot {
    /// A snapshot with no accelerator and unknown host resources.
    pub fn cpu_only() -> Self {
        Self {
            gpu_available: false,
            gpu_count: 0,
            gpu_memory_gb: 0,
            system_memory_gb: None,
            cpu_count: None,
        }
    }
}
