//! platconf - CMake configuration front end for multi-platform engine builds
//!
//! This crate provides the library behind the `platconf` binary: option
//! schemas per target platform, resolution of parsed options into an ordered
//! CMake variable mapping, and invocation of the generator.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use core::{
    environment::Environment, mapping::ConfigurationMapping, options::OptionsRecord,
    platform::Platform, schema::SchemaRegistry,
};

pub use resolver::resolve;
pub use util::context::GlobalContext;
