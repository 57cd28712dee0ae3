//! Shared primitives: geometry, colors, configuration and the error taxonomy.

pub mod config;
pub mod core;
pub mod error;
pub(crate) mod math;
