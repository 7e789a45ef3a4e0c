//! User-friendly diagnostic messages.
//!
//! Every error reported to the user names the root cause and, where one
//! exists, the command or config change that fixes it.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the environment is incomplete.
    pub const SHOW_ENVIRONMENT: &str = "help: Run `platconf env` to see the loaded environment";

    /// Suggestion when a platform isn't offered on this host.
    pub const LIST_PLATFORMS: &str = "help: Run `platconf platforms` to see available platforms";

    /// Suggestion when the generator fails.
    pub const GENERATOR_FAILED: &str =
        "help: Re-run with `--dry-run` to inspect the configuration mapping";
}

/// An error message with context and suggested fixes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let (error, help) = if color {
            ("\x1b[1;31merror\x1b[0m", "\x1b[1;32mhelp\x1b[0m")
        } else {
            ("error", "help")
        };

        let mut output = format!("{}: {}\n", error, self.message);

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}: consider:\n", help));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// A platform was requested that this host can't target.
#[derive(Debug, Error, MietteDiagnostic, PartialEq, Eq)]
#[error("platform `{platform}` is not available on {host}")]
#[diagnostic(
    code(platconf::platform::unavailable),
    help("Run `platconf platforms` to see the platforms this host can configure")
)]
pub struct UnavailablePlatformError {
    pub platform: String,
    pub host: &'static str,
}

impl UnavailablePlatformError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string())
            .with_suggestion(suggestions::LIST_PLATFORMS.trim_start_matches("help: "))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
