//! Command implementations

pub mod completions;
pub mod configure;
pub mod env;
pub mod platforms;
