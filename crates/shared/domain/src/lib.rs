//! Pure domain types for the Studio platform.
//!
//! Configuration structures, shared constants, and the slice-registry
//! primitives. Dependency surface stays at `serde`; no I/O and no feature
//! logic belong here.

pub mod config;
pub mod constants;
pub mod registry;
