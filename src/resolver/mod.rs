//! Parameter resolution.
//!
//! Turns a command's parsed options into the ordered configuration mapping
//! handed to the generator. The resolver is pure and deterministic - all
//! environment loading happens before resolution.

pub mod errors;
pub mod resolve;

pub use errors::ResolveError;
pub use resolve::{
    apply_platform_overrides, resolve, resolve_platform, select_feature, Selection,
    SYSTEM_LIBRARY,
};
