//! Tool configuration loading and schema definitions
//!
//! Settings for the resolver front end: where the declared fragment and the
//! umbrella project live, how to print results, and how loud to log.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;
