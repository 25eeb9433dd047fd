//! Core types and utilities for hookline
//!
//! This is the foundation crate (Layer 0) that all other hookline crates depend on.
//! It provides:
//! - Base error types
//! - Platform detection (command line limits)
//! - Git hook lifecycle stages
//!
//! This crate has no dependencies on other hookline crates.

pub mod error;
pub mod platform;
pub mod stage;

pub use error::{Error, Result};
pub use stage::Stage;
