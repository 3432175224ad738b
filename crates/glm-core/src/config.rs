//! glm.toml launcher configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LauncherResult;
use crate::registry::ModelRegistry;
use crate::types::ModelDescriptor;

/// File name looked up inside `models_dir` when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "glm.toml";

const CACHE_DIR_NAME: &str = ".cache/glm-distributed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Where model artifacts and cluster files live.
    pub models_dir: PathBuf,
    /// Inference engine executable.
    pub engine: String,
    /// Tool invoked as `<downloader> -O <path> <url>` to fetch artifacts.
    pub downloader: String,
    /// Command written into node startup scripts to start a worker.
    pub worker_entry: String,
    /// Extra registry entries layered over the built-in models.
    pub models: Vec<ModelDescriptor>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            engine: "./dllama".to_string(),
            downloader: "wget".to_string(),
            worker_entry: "glm".to_string(),
            models: Vec::new(),
        }
    }
}

impl LauncherConfig {
    pub fn from_file(path: &Path) -> LauncherResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `explicit` if given, else `<default models_dir>/glm.toml` when it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> LauncherResult<Self> {
        if let Some(path) = explicit {
            debug!("loading config from {}", path.display());
            return Self::from_file(path);
        }

        let implicit = default_models_dir().join(CONFIG_FILE_NAME);
        if implicit.is_file() {
            debug!("loading config from {}", implicit.display());
            return Self::from_file(&implicit);
        }

        Ok(Self::default())
    }

    /// Built-in registry extended with the configured models.
    pub fn registry(&self) -> ModelRegistry {
        ModelRegistry::builtin().with_models(self.models.iter().cloned())
    }
}

/// `$HOME/.cache/glm-distributed`, or relative to the working directory when
/// no home directory can be determined.
pub fn default_models_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_DIR_NAME)
}
