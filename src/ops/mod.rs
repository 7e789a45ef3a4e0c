//! High-level operations.
//!
//! This module contains the implementation of platconf commands.

pub mod configure;
pub mod env_report;

pub use configure::{
    configure, configure_with, plan, ConfigureError, ConfigureOptions, ConfigurePlan,
    OutputFormat,
};
pub use env_report::{env_report, format_report, required_keys, EnvReport};
