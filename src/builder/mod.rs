//! Build-system generation.
//!
//! Runs the external generator over a resolved configuration mapping.

pub mod cmake;

pub use cmake::{CMake, Generator, GeneratorError, GeneratorInvocation};
