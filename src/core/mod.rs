//! Core data structures for platconf.
//!
//! This module contains the foundational types used throughout platconf:
//! - Option schemas and the parsed options record
//! - The ordered configuration mapping handed to the generator
//! - Platform descriptors and host gating
//! - The machine environment

pub mod environment;
pub mod mapping;
pub mod options;
pub mod platform;
pub mod schema;

pub use environment::{EnvKey, Environment, EnvironmentError};
pub use mapping::ConfigurationMapping;
pub use options::{OptionValue, OptionsRecord};
pub use platform::{available_platforms, registry_for, Platform, PlatformDescriptor};
pub use schema::{CommandSchema, SchemaError, SchemaRegistry};
