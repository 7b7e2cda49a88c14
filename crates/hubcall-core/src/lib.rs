//! Core types and utilities for hubcall.
//!
//! This crate provides what the invoker and the command layer share:
//! - [`Settings`] for process-wide configuration
//! - [`instance`] host templating for public and enterprise GitHub
//! - [`pii`] scrubbing for telemetry properties
//! - [`Output`] for capturable command output

pub mod cmdutil;
pub mod config;
pub mod errors;
pub mod instance;
pub mod output;
pub mod pii;
#[cfg(test)]
pub mod test_utils;

pub use config::Settings;
pub use output::Output;
