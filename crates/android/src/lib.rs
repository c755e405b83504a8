//! Build configuration resolver for the chores Android embedding
//!
//! This crate turns the app module's declarations and the umbrella Flutter
//! project's defaults into one validated descriptor:
//! - Declared fragment (built-in or TOML)
//! - Umbrella defaults from `local.properties` and `pubspec.yaml`
//! - Signing table and build type resolution
//! - Gradle Kotlin DSL rendering of the result
//!
//! # Example
//!
//! ```rust
//! use chores_android::{resolve, DeclaredConfig, Defaults};
//!
//! let config = resolve(&DeclaredConfig::chores(), &Defaults::new(34, 21, 34, 3, "1.2.0"))
//!     .expect("shipped fragment resolves");
//! assert_eq!(config.application_id(), "com.example.flutter_application_chores");
//! assert!(config.release_uses_debug_signing());
//! ```

pub mod build_config;
pub mod declared;
pub mod defaults;
pub mod dependency;
pub mod error;
pub mod gradle;
pub mod java;
pub mod signing;

pub use build_config::{resolve, BuildConfig};
pub use declared::DeclaredConfig;
pub use defaults::Defaults;
pub use error::ConfigurationError;
pub use java::JavaVersion;
