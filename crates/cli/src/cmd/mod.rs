//! CLI command implementations
//!
//! Repository commands (`run`, `list`, `install`, `uninstall`) implement
//! [`Command`](crate::command::Command); the rest are plain functions.

pub mod clean;
pub mod install;
pub mod list;
pub mod run;
pub mod sample;
pub mod validate;
