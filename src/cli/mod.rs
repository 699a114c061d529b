// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for replaying landmark recordings.
//!
//! This module contains the command-line interface logic, including argument parsing
//! and the `replay` and `analyze` command implementations.

// Modules
/// Per-frame measurement report.
pub mod analyze;

/// CLI arguments.
pub mod args;

/// Recording replay through the capture flow.
pub mod replay;
