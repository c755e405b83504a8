//! CLI utilities for the chores Android build tooling
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Logging setup

#![warn(missing_docs)]

pub mod logging;
pub mod output;
