//! Configuration schema definitions

use crate::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub umbrella: UmbrellaConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl ConfigSchema {
    /// Check values serde cannot reject on its own
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .required("general.module_dir", &self.general.module_dir.to_string_lossy())
            .required("umbrella.properties_file", &self.umbrella.properties_file)
            .required("umbrella.pubspec_file", &self.umbrella.pubspec_file)
            .one_of(
                "log.level",
                &self.log.level,
                &["error", "warn", "info", "debug", "trace"],
            )
            .warn_if(
                "general.declared",
                self.general.declared.is_none(),
                "No declared fragment configured; using the built-in chores fragment",
            )
            .validate()
    }
}

/// Where the Android module lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Android app module directory, relative to the working directory
    #[serde(default = "default_module_dir")]
    pub module_dir: PathBuf,

    /// TOML file holding the declared fragment. The built-in fragment is used when unset.
    #[serde(default)]
    pub declared: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            module_dir: default_module_dir(),
            declared: None,
        }
    }
}

fn default_module_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Umbrella project descriptor lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UmbrellaConfig {
    /// Umbrella root override. Falls back to the fragment's `flutter.source`.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Properties file carrying `flutter.*` defaults, relative to the umbrella root
    #[serde(default = "default_properties_file")]
    pub properties_file: String,

    /// Pubspec carrying the `version:` line, relative to the umbrella root
    #[serde(default = "default_pubspec_file")]
    pub pubspec_file: String,
}

impl Default for UmbrellaConfig {
    fn default() -> Self {
        Self {
            root: None,
            properties_file: default_properties_file(),
            pubspec_file: default_pubspec_file(),
        }
    }
}

fn default_properties_file() -> String {
    "android/local.properties".to_string()
}

fn default_pubspec_file() -> String {
    "pubspec.yaml".to_string()
}

/// Output formats for a resolved descriptor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored key/value listing
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// Gradle Kotlin DSL module script
    Gradle,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Human => "human",
            Self::Json => "json",
            Self::Gradle => "gradle",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "gradle" | "kts" => Ok(Self::Gradle),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Colored terminal output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Base level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
