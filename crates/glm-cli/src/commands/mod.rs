pub mod cluster;
pub mod list;
pub mod run;

use glm_core::{LauncherConfig, ModelRegistry};

/// State shared by every subcommand.
pub struct Context {
    pub config: LauncherConfig,
    pub registry: ModelRegistry,
    /// Print engine commands instead of fetching and running.
    pub dry_run: bool,
}

impl Context {
    pub fn new(config: LauncherConfig, dry_run: bool) -> Self {
        let registry = config.registry();
        Self {
            config,
            registry,
            dry_run,
        }
    }
}
