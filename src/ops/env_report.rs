//! Report of the loaded machine environment.
//!
//! Backs `platconf env`: shows which config layers were consulted and where
//! every environment path came from, so missing keys can be fixed before a
//! configure run fails on them.

use std::fmt::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::environment::{EnvKey, Environment};
use crate::core::platform::Platform;
use crate::util::config::EnvConfig;

/// A config file layer and whether it exists.
#[derive(Debug, Clone, Serialize)]
pub struct LayerStatus {
    pub path: PathBuf,
    pub exists: bool,
}

/// One environment key.
#[derive(Debug, Clone, Serialize)]
pub struct EnvEntry {
    /// Dotted config key (`android.ndk`)
    pub key: &'static str,
    /// Overriding variable
    pub env_var: &'static str,
    /// Resolved path, if any layer provides one
    pub value: Option<PathBuf>,
    /// Where the value came from
    pub origin: Option<String>,
    /// Platforms that can't be configured without this key
    pub required_by: Vec<&'static str>,
}

/// The full report.
#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub layers: Vec<LayerStatus>,
    pub entries: Vec<EnvEntry>,
    /// Effective default for `--cpp`
    pub cpp_std: String,
}

impl EnvReport {
    /// Whether every key needed by `platform` is set.
    pub fn is_complete_for(&self, platform: Platform) -> bool {
        self.entries
            .iter()
            .filter(|e| e.required_by.contains(&platform.command()))
            .all(|e| e.value.is_some())
    }
}

/// Keys a platform's configure run requires.
pub fn required_keys(platform: Platform) -> Vec<EnvKey> {
    let mut keys = vec![EnvKey::Dependencies, EnvKey::Prebuilt, EnvKey::CMake];
    keys.extend(platform.descriptor().toolchain);
    match platform {
        Platform::Android => keys.push(EnvKey::AndroidNdk),
        Platform::Emscripten => keys.push(EnvKey::EmscriptenRoot),
        Platform::Windows | Platform::MacOs | Platform::Ios => {}
    }
    keys
}

/// Build the report for the given layers and loaded environment.
pub fn env_report(
    layers: &[PathBuf],
    config: &EnvConfig,
    env: &Environment,
    platforms: &[Platform],
) -> EnvReport {
    let layers = layers
        .iter()
        .map(|path| LayerStatus {
            path: path.clone(),
            exists: path.exists(),
        })
        .collect();

    let entries = EnvKey::ALL
        .into_iter()
        .map(|key| {
            let entry = env.entry(key);
            EnvEntry {
                key: key.config_key(),
                env_var: key.env_var(),
                value: entry.map(|e| e.path.clone()),
                origin: entry.map(|e| e.origin.to_string()),
                required_by: platforms
                    .iter()
                    .filter(|p| required_keys(**p).contains(&key))
                    .map(|p| p.command())
                    .collect(),
            }
        })
        .collect();

    EnvReport {
        layers,
        entries,
        cpp_std: config.cpp_std().to_string(),
    }
}

/// Format the report for terminal output.
pub fn format_report(report: &EnvReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Config files:");
    for layer in &report.layers {
        let status = if layer.exists { "[OK]" } else { "[--]" };
        let _ = writeln!(output, "  {} {}", status, layer.path.display());
    }

    let _ = writeln!(output, "\nPaths:");
    let width = report.entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    for entry in &report.entries {
        match (&entry.value, &entry.origin) {
            (Some(value), Some(origin)) => {
                let _ = writeln!(
                    output,
                    "  {:<width$}  {} ({})",
                    entry.key,
                    value.display(),
                    origin,
                    width = width
                );
            }
            _ => {
                let _ = writeln!(
                    output,
                    "  {:<width$}  <unset> (set {})",
                    entry.key,
                    entry.env_var,
                    width = width
                );
            }
        }
    }

    let _ = writeln!(output, "\nDefaults:");
    let _ = writeln!(output, "  cpp_std = {}", report.cpp_std);

    output
}
