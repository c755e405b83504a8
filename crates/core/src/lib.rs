//! Core utilities for the chores Android build tooling
//!
//! Shared functionality used by the Android resolver and its command line:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML tool configuration with defaults and lookup
//! - **Validation**: fluent field validation and identifier grammars
//!
//! # Example
//!
//! ```rust,no_run
//! use chores_core::config::Config;
//!
//! let config = Config::load(None).expect("config");
//! let report = config.schema.validate();
//! if !report.is_valid() {
//!     eprintln!("Configuration issues detected!");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

