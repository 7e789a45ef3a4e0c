//! Global context for platconf operations.
//!
//! Provides centralized access to the working directory and the config
//! layers the machine environment is assembled from.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::environment::Environment;
use crate::util::config::{
    global_env_config_path, load_env_config, project_env_config_path, EnvConfig,
};

/// Global context containing the working directory and config paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global environment file (~/.platconf/env.toml), if a home exists
    global_env: Option<PathBuf>,

    /// File given with `--env-file`
    env_file: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        Ok(GlobalContext {
            cwd,
            global_env: global_env_config_path(),
            env_file: None,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use an explicit environment file on top of the discovered layers.
    pub fn with_env_file(mut self, path: Option<PathBuf>) -> Self {
        self.env_file = path.map(|p| if p.is_absolute() { p } else { self.cwd.join(p) });
        self
    }

    /// Skip the global layer. Used by tests so the machine's own
    /// `~/.platconf` can't leak in.
    pub fn without_global_env(mut self) -> Self {
        self.global_env = None;
        self
    }

    /// Get the config files that will be consulted, in precedence order
    /// (lowest first).
    pub fn env_layers(&self) -> Vec<PathBuf> {
        let mut layers: Vec<PathBuf> = self.global_env.iter().cloned().collect();
        layers.push(project_env_config_path(&self.cwd));
        layers.extend(self.env_file.iter().cloned());
        layers
    }

    /// Load and merge the environment config files.
    pub fn load_env_config(&self) -> Result<EnvConfig> {
        load_env_config(
            self.global_env.as_deref(),
            &project_env_config_path(&self.cwd),
            self.env_file.as_deref(),
        )
    }

    /// Load the full machine environment: config layers, then `PLATCONF_*`
    /// variables, then tools found on `PATH`.
    pub fn load_environment(&self) -> Result<(EnvConfig, Environment)> {
        let config = self.load_env_config()?;
        let env = Environment::from_config(&config, |name| std::env::var(name).ok())
            .discover_tools();
        Ok((config, env))
    }
}
