//! Common utilities for the Lumen box tree.
//!
//! This crate provides shared infrastructure used by every Lumen component:
//! - **Warning System** - colored, deduplicated terminal output
//! - **Invariant reporting** - programmer-error checks that are fatal in
//!   debug builds and downgraded to warnings in release builds

pub mod invariant;
pub mod warning;
