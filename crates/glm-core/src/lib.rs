//! glm-core: shared types and collaborators for the GLM launcher.
//!
//! - **`types`**: model descriptors and hardware snapshots
//! - **`registry`**: immutable model lookup table
//! - **`hardware`**: best-effort hardware probe
//! - **`config`**: `glm.toml` launcher configuration
//! - **`cache`**: local model artifact cache

pub mod cache;
pub mod config;
pub mod error;
pub mod hardware;
pub mod registry;
pub mod types;

pub use cache::ModelCache;
pub use config::LauncherConfig;
pub use error::{LauncherError, LauncherResult};
pub use hardware::{HardwareProbe, StaticProbe, SystemProbe};
pub use registry::ModelRegistry;
pub use types::*;
