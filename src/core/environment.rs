//! Machine environment: where dependencies, toolchains and tools live.
//!
//! The environment is assembled once per invocation from config files and
//! `PLATCONF_*` variables (see [`crate::util::config`]) and is read-only
//! afterwards. Lookups of paths a platform needs but the machine doesn't
//! provide fail with [`EnvironmentError::Missing`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::config::EnvConfig;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::find_cmake;

/// A named environment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnvKey {
    /// Root of the prebuilt third-party dependencies
    Dependencies,
    /// Root of installed engine builds
    Prebuilt,
    /// CMake executable
    CMake,
    /// iOS CMake toolchain file
    IosToolchain,
    /// Android CMake toolchain file
    AndroidToolchain,
    /// Android NDK root
    AndroidNdk,
    /// Emscripten CMake toolchain file
    EmscriptenToolchain,
    /// Emscripten SDK root
    EmscriptenRoot,
}

impl EnvKey {
    /// All keys, in display order.
    pub const ALL: [EnvKey; 8] = [
        EnvKey::Dependencies,
        EnvKey::Prebuilt,
        EnvKey::CMake,
        EnvKey::IosToolchain,
        EnvKey::AndroidToolchain,
        EnvKey::AndroidNdk,
        EnvKey::EmscriptenToolchain,
        EnvKey::EmscriptenRoot,
    ];

    /// Dotted key in `env.toml`.
    pub fn config_key(&self) -> &'static str {
        match self {
            EnvKey::Dependencies => "paths.dependencies",
            EnvKey::Prebuilt => "paths.prebuilt",
            EnvKey::CMake => "paths.cmake",
            EnvKey::IosToolchain => "ios.toolchain",
            EnvKey::AndroidToolchain => "android.toolchain",
            EnvKey::AndroidNdk => "android.ndk",
            EnvKey::EmscriptenToolchain => "emscripten.toolchain",
            EnvKey::EmscriptenRoot => "emscripten.root",
        }
    }

    /// Overriding environment variable.
    pub fn env_var(&self) -> &'static str {
        match self {
            EnvKey::Dependencies => "PLATCONF_DEPENDENCIES",
            EnvKey::Prebuilt => "PLATCONF_PREBUILT",
            EnvKey::CMake => "PLATCONF_CMAKE",
            EnvKey::IosToolchain => "PLATCONF_IOS_TOOLCHAIN",
            EnvKey::AndroidToolchain => "PLATCONF_ANDROID_TOOLCHAIN",
            EnvKey::AndroidNdk => "PLATCONF_ANDROID_NDK",
            EnvKey::EmscriptenToolchain => "PLATCONF_EMSCRIPTEN_TOOLCHAIN",
            EnvKey::EmscriptenRoot => "PLATCONF_EMSCRIPTEN",
        }
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// A required environment path is unavailable.
#[derive(Debug, Error, MietteDiagnostic, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("environment path `{key}` is not configured")]
    #[diagnostic(
        code(platconf::env::missing),
        help("set the matching PLATCONF_* variable or add the key to .platconf/env.toml")
    )]
    Missing { key: EnvKey, env_var: &'static str },
}

impl EnvironmentError {
    /// Build the error for a missing key.
    pub fn missing(key: EnvKey) -> Self {
        EnvironmentError::Missing {
            key,
            env_var: key.env_var(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            EnvironmentError::Missing { key, env_var } => {
                let mut diag = Diagnostic::error(format!(
                    "environment path `{}` is not configured",
                    key
                ))
                .with_suggestion(format!("Export `{}=<path>`", env_var))
                .with_suggestion(format!(
                    "Add `{}` under [{}] in .platconf/env.toml",
                    key.config_key().rsplit('.').next().unwrap_or_default(),
                    key.config_key().split('.').next().unwrap_or_default()
                ))
                .with_suggestion(suggestions::SHOW_ENVIRONMENT.trim_start_matches("help: "));

                if *key == EnvKey::CMake {
                    diag = diag.with_context("`cmake` was not found on PATH either");
                }

                diag
            }
        }
    }
}

/// Where an environment value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A config file layer
    File(PathBuf),
    /// A `PLATCONF_*` variable
    Variable(&'static str),
    /// Found on `PATH`
    Discovered,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Variable(name) => write!(f, "${}", name),
            Origin::Discovered => write!(f, "PATH"),
        }
    }
}

/// A resolved environment path and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvValue {
    pub path: PathBuf,
    pub origin: Origin,
}

/// The loaded machine environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    values: BTreeMap<EnvKey, EnvValue>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Environment::default()
    }

    /// Set a path, returning the environment for chaining.
    pub fn with(mut self, key: EnvKey, path: impl Into<PathBuf>) -> Self {
        self.set(key, path.into(), Origin::Variable(key.env_var()));
        self
    }

    /// Set a path with an explicit origin.
    pub fn set(&mut self, key: EnvKey, path: PathBuf, origin: Origin) {
        self.values.insert(key, EnvValue { path, origin });
    }

    /// Build the environment from config layers, then variables.
    ///
    /// `var` looks up an environment variable; empty values are ignored.
    pub fn from_config<F>(config: &EnvConfig, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = Environment::new();

        for key in EnvKey::ALL {
            if let Some((path, source)) = config.lookup(key) {
                env.set(key, path.to_path_buf(), Origin::File(source.to_path_buf()));
            }

            if let Some(value) = var(key.env_var()).filter(|v| !v.is_empty()) {
                env.set(key, PathBuf::from(value), Origin::Variable(key.env_var()));
            }
        }

        env
    }

    /// Fill in tools that can be found on `PATH`.
    pub fn discover_tools(mut self) -> Self {
        if !self.values.contains_key(&EnvKey::CMake) {
            if let Some(cmake) = find_cmake() {
                tracing::debug!("using cmake from PATH: {}", cmake.display());
                self.set(EnvKey::CMake, cmake, Origin::Discovered);
            }
        }
        self
    }

    /// Look up a path that may be absent.
    pub fn get(&self, key: EnvKey) -> Option<&Path> {
        self.values.get(&key).map(|v| v.path.as_path())
    }

    /// Look up a path the caller can't proceed without.
    pub fn require(&self, key: EnvKey) -> Result<&Path, EnvironmentError> {
        self.get(key).ok_or_else(|| EnvironmentError::missing(key))
    }

    /// Look up a value together with its origin.
    pub fn entry(&self, key: EnvKey) -> Option<&EnvValue> {
        self.values.get(&key)
    }

    /// Root of the prebuilt third-party dependencies.
    pub fn dependencies(&self) -> Result<&Path, EnvironmentError> {
        self.require(EnvKey::Dependencies)
    }

    /// Root of installed engine builds.
    pub fn prebuilt(&self) -> Result<&Path, EnvironmentError> {
        self.require(EnvKey::Prebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_key() {
        let env = Environment::new();
        let err = env.require(EnvKey::AndroidNdk).unwrap_err();

        assert_eq!(err, EnvironmentError::missing(EnvKey::AndroidNdk));
        assert_eq!(
            err.to_string(),
            "environment path `android.ndk` is not configured"
        );
    }

    #[test]
    fn test_variable_overrides_file() {
        let config: EnvConfig = toml::from_str(
            r#"
[paths]
dependencies = "/from/file"
prebuilt = "/prebuilt"
"#,
        )
        .unwrap();
        let config = config.with_source("/etc/env.toml");

        let env = Environment::from_config(&config, |name| match name {
            "PLATCONF_DEPENDENCIES" => Some("/from/var".to_string()),
            "PLATCONF_PREBUILT" => Some(String::new()),
            _ => None,
        });

        assert_eq!(env.dependencies().unwrap(), Path::new("/from/var"));
        assert_eq!(
            env.entry(EnvKey::Dependencies).unwrap().origin,
            Origin::Variable("PLATCONF_DEPENDENCIES")
        );
        // Empty variables don't shadow the file
        assert_eq!(env.prebuilt().unwrap(), Path::new("/prebuilt"));
        assert_eq!(
            env.entry(EnvKey::Prebuilt).unwrap().origin,
            Origin::File(PathBuf::from("/etc/env.toml"))
        );
    }

    #[test]
    fn test_diagnostic_suggests_fixes() {
        let output = EnvironmentError::missing(EnvKey::AndroidNdk)
            .to_diagnostic()
            .format(false);

        assert!(output.contains("error: environment path `android.ndk`"));
        assert!(output.contains("PLATCONF_ANDROID_NDK"));
        assert!(output.contains("Add `ndk` under [android]"));
        assert!(output.contains("3. Run `platconf env`"));
    }
}
