//! Local cache of model artifacts.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{LauncherError, LauncherResult};
use crate::types::ModelDescriptor;

#[derive(Debug, Clone)]
pub struct ModelCache {
    dir: PathBuf,
    downloader: String,
}

impl ModelCache {
    pub fn new(dir: impl Into<PathBuf>, downloader: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            downloader: downloader.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("{model_name}.gguf"))
    }

    /// Return the local artifact path, fetching it first if it is missing.
    ///
    /// The fetch runs once; any failure is returned as-is.
    pub fn ensure(&self, model: &ModelDescriptor) -> LauncherResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&model.name);
        if path.is_file() {
            return Ok(path);
        }

        info!("model {} not found locally, downloading from {}", model.name, model.source_url);

        let status = Command::new(&self.downloader)
            .arg("-O")
            .arg(&path)
            .arg(&model.source_url)
            .status()
            .map_err(|e| LauncherError::Fetch(format!("cannot run '{}': {e}", self.downloader)))?;

        if !status.success() {
            return Err(LauncherError::Fetch(format!(
                "'{}' exited with {status} while fetching {}",
                self.downloader, model.source_url
            )));
        }

        info!("model downloaded to {}", path.display());
        Ok(path)
    }
}
