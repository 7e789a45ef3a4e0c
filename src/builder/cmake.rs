//! CMake generator invocation.
//!
//! The resolved [`ConfigurationMapping`] is turned into a `cmake`
//! command line and run with inherited stdio so the user sees CMake's own
//! output. Nothing is retried.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::mapping::ConfigurationMapping;
use crate::util::fs::{cmake_path, ensure_dir};
use crate::util::process::ProcessBuilder;

/// Everything needed to run one generator configuration.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorInvocation {
    /// CMake generator name (`-G`)
    pub generator_kind: String,
    /// Source tree (`-S`)
    pub source_dir: PathBuf,
    /// Build tree (`-B`)
    pub output_dir: PathBuf,
    /// `CMAKE_INSTALL_PREFIX`
    pub install_prefix: PathBuf,
    /// Resolved variables, passed as `-D` in order
    pub mapping: ConfigurationMapping,
}

impl GeneratorInvocation {
    /// Command-line arguments, without the executable.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-G".to_string(),
            self.generator_kind.clone(),
            "-S".to_string(),
            cmake_path(&self.source_dir),
            "-B".to_string(),
            cmake_path(&self.output_dir),
            format!("-DCMAKE_INSTALL_PREFIX={}", cmake_path(&self.install_prefix)),
        ];
        args.extend(self.mapping.to_defines());
        args
    }

    /// Build the process for a given cmake executable.
    pub fn command(&self, cmake: &Path) -> ProcessBuilder {
        ProcessBuilder::new(cmake).args(self.args())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Generator failures.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to create build directory `{}`", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to run `{}`", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("{}", failed_message(*code))]
    Failed { code: Option<i32> },
}

fn failed_message(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("generator exited with status {}", code),
        None => "generator was terminated by a signal".to_string(),
    }
}

impl GeneratorError {
    /// Process exit code to surface to the caller.
    pub fn exit_code(&self) -> i32 {
        match self {
            GeneratorError::Failed { code: Some(code) } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Something that can run a generator invocation.
pub trait Generator {
    /// Run the invocation to completion.
    fn generate(&self, invocation: &GeneratorInvocation) -> Result<(), GeneratorError>;
}

/// The CMake executable.
#[derive(Debug, Clone)]
pub struct CMake {
    executable: PathBuf,
}

impl CMake {
    /// Create a generator for the given cmake executable.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        CMake {
            executable: executable.into(),
        }
    }
}

impl Generator for CMake {
    fn generate(&self, invocation: &GeneratorInvocation) -> Result<(), GeneratorError> {
        ensure_dir(&invocation.output_dir).map_err(|source| GeneratorError::OutputDir {
            path: invocation.output_dir.clone(),
            source: source.into(),
        })?;

        let cmd = invocation.command(&self.executable);
        tracing::debug!("running {}", cmd.display_command());

        let status = cmd.status().map_err(|source| GeneratorError::Spawn {
            program: self.executable.clone(),
            source: source.into(),
        })?;

        if !status.success() {
            return Err(GeneratorError::Failed {
                code: status.code(),
            });
        }

        Ok(())
    }
}
