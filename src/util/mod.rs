//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::EnvConfig;
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use shell::{ColorChoice, Shell, Status, Verbosity};
