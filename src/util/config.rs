//! Environment configuration files.
//!
//! platconf reads up to three `env.toml` layers:
//! - Global: `~/.platconf/env.toml` - machine-wide paths
//! - Project: `.platconf/env.toml` - checkout-specific overrides
//! - Explicit: `--env-file <PATH>` - highest precedence
//!
//! Later layers override earlier ones key by key. Relative paths are taken
//! relative to the directory of the file that declares them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::environment::EnvKey;

/// Name of the config directory, global and per project.
pub const CONFIG_DIR: &str = ".platconf";

/// Name of the environment config file.
pub const ENV_FILE: &str = "env.toml";

/// Default C++ standard when neither the CLI nor config sets one.
pub const DEFAULT_CPP_STD: &str = "11";

/// Contents of one or more merged `env.toml` files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Shared paths
    pub paths: PathsConfig,

    /// iOS SDK settings
    pub ios: IosConfig,

    /// Android SDK settings
    pub android: AndroidConfig,

    /// Emscripten SDK settings
    pub emscripten: EmscriptenConfig,

    /// Build defaults
    pub build: BuildConfig,

    /// File each path was read from
    #[serde(skip)]
    sources: BTreeMap<EnvKey, PathBuf>,
}

/// `[paths]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Prebuilt third-party dependencies root
    pub dependencies: Option<PathBuf>,

    /// Installed engine builds root
    pub prebuilt: Option<PathBuf>,

    /// CMake executable
    pub cmake: Option<PathBuf>,
}

/// `[ios]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IosConfig {
    pub toolchain: Option<PathBuf>,
}

/// `[android]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidConfig {
    pub toolchain: Option<PathBuf>,

    /// NDK root directory
    pub ndk: Option<PathBuf>,
}

/// `[emscripten]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmscriptenConfig {
    pub toolchain: Option<PathBuf>,

    /// Emscripten SDK root
    pub root: Option<PathBuf>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default C++ standard (`--cpp`)
    pub cpp_std: Option<String>,
}

impl EnvConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read environment config: {}", path.display()))?;

        let config: EnvConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse environment config: {}", path.display()))?;

        Ok(config.with_source(path))
    }

    /// Record `path` as the origin of every value, anchoring relative paths
    /// at its directory.
    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        for key in EnvKey::ALL {
            if let Some(value) = self.field_mut(key) {
                if value.is_relative() {
                    *value = base.join(&*value);
                }
                self.sources.insert(key, path.to_path_buf());
            }
        }

        self
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, mut other: EnvConfig) {
        for key in EnvKey::ALL {
            if let Some(value) = other.field_mut(key).take() {
                *self.field_mut(key) = Some(value);
                match other.sources.remove(&key) {
                    Some(source) => self.sources.insert(key, source),
                    None => self.sources.remove(&key),
                };
            }
        }

        if other.build.cpp_std.is_some() {
            self.build.cpp_std = other.build.cpp_std;
        }
    }

    /// Look up a path and the file that declared it.
    pub fn lookup(&self, key: EnvKey) -> Option<(&Path, &Path)> {
        let value = self.field(key).as_deref()?;
        let source = self
            .sources
            .get(&key)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(ENV_FILE));
        Some((value, source))
    }

    /// C++ standard to use when `--cpp` isn't given.
    pub fn cpp_std(&self) -> &str {
        self.build.cpp_std.as_deref().unwrap_or(DEFAULT_CPP_STD)
    }

    fn field(&self, key: EnvKey) -> &Option<PathBuf> {
        match key {
            EnvKey::Dependencies => &self.paths.dependencies,
            EnvKey::Prebuilt => &self.paths.prebuilt,
            EnvKey::CMake => &self.paths.cmake,
            EnvKey::IosToolchain => &self.ios.toolchain,
            EnvKey::AndroidToolchain => &self.android.toolchain,
            EnvKey::AndroidNdk => &self.android.ndk,
            EnvKey::EmscriptenToolchain => &self.emscripten.toolchain,
            EnvKey::EmscriptenRoot => &self.emscripten.root,
        }
    }

    fn field_mut(&mut self, key: EnvKey) -> &mut Option<PathBuf> {
        match key {
            EnvKey::Dependencies => &mut self.paths.dependencies,
            EnvKey::Prebuilt => &mut self.paths.prebuilt,
            EnvKey::CMake => &mut self.paths.cmake,
            EnvKey::IosToolchain => &mut self.ios.toolchain,
            EnvKey::AndroidToolchain => &mut self.android.toolchain,
            EnvKey::AndroidNdk => &mut self.android.ndk,
            EnvKey::EmscriptenToolchain => &mut self.emscripten.toolchain,
            EnvKey::EmscriptenRoot => &mut self.emscripten.root,
        }
    }
}

/// Get the global platconf config directory (~/.platconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global environment config path (~/.platconf/env.toml).
pub fn global_env_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(ENV_FILE))
}

/// Get the project environment config path (.platconf/env.toml).
pub fn project_env_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(ENV_FILE)
}

/// Load merged environment configuration.
///
/// Order of precedence (highest to lowest):
/// 1. Explicit file (`--env-file`), which must exist
/// 2. Project config (.platconf/env.toml)
/// 3. Global config (~/.platconf/env.toml)
/// 4. Defaults
pub fn load_env_config(
    global_path: Option<&Path>,
    project_path: &Path,
    explicit_path: Option<&Path>,
) -> Result<EnvConfig> {
    let mut config = EnvConfig::default();

    for path in global_path.into_iter().chain(Some(project_path)) {
        if path.exists() {
            tracing::debug!("loading environment from {}", path.display());
            config.merge(EnvConfig::load(path)?);
        }
    }

    if let Some(path) = explicit_path {
        if !path.exists() {
            bail!("environment file not found: {}", path.display());
        }
        tracing::debug!("loading environment from {}", path.display());
        config.merge(EnvConfig::load(path)?);
    }

    Ok(config)
}
