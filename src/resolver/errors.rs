//! Resolution error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::environment::EnvironmentError;
use crate::util::diagnostic::Diagnostic;

/// Error while resolving options into a configuration mapping.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("invalid value `{value}` for `--{option}`")]
    InvalidChoice {
        option: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("failed to resolve path `{}`", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::Environment(err) => err.to_diagnostic(),

            ResolveError::InvalidChoice {
                option,
                value,
                allowed,
            } => Diagnostic::error(format!("invalid value `{}` for `--{}`", value, option))
                .with_context(format!("possible values: {}", allowed.join(", "))),

            ResolveError::Path { path, source } => {
                Diagnostic::error(format!("failed to resolve path `{}`", path.display()))
                    .with_context(source.to_string())
            }
        }
    }
}
