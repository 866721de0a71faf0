//! Kernel utilities shared across slices.
//! Keep this crate lightweight; it re-exports the domain models and an ergonomic config loader.
//!
//! ## Config loading
//! ```rust,ignore
//! use studio_kernel::config::load_config;
//! use studio_kernel::domain::config::StudioConfig;
//!
//! let cfg: StudioConfig = load_config(None::<&str>).unwrap();
//! ```

pub mod config;

pub use studio_domain as domain;
