#![deny(unsafe_code)]

//! Shared test utilities for the volhud workspace.
//!
//! Provides reusable fixtures, config builders, a recording presenter,
//! and tracing helpers so that individual crate tests stay concise and
//! consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! volhud-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod daemon;
pub mod presenter;
pub mod tracing_setup;
