//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Standard locations searched when no `--config` is given, in order
pub const CONFIG_CANDIDATES: [&str; 3] = [
    ".chores-android.toml",
    "chores-android.toml",
    ".config/chores-android.toml",
];

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path, a standard location, or use defaults
    ///
    /// An explicit path that does not exist is an error; a missing file in the
    /// standard locations is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Path::new("."))
    }

    /// Like [`Config::load`], searching the standard locations under `base`
    pub fn load_from(path: Option<&Path>, base: &Path) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(base),
        };

        let schema = if let Some(ref p) = config_path {
            tracing::debug!(path = %p.display(), "Loading tool configuration");
            load_config_file(p)?
        } else {
            tracing::debug!("No tool configuration found, using defaults");
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file(base: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|candidate| candidate.exists())
}

/// Load, parse and validate a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))?;

    let report = schema.validate();
    for warning in report.warnings() {
        tracing::warn!(field = %warning.field, "{}", warning.message);
    }
    report.to_result().map_err(|e| {
        Error::new(ErrorCode::ConfigValidationError, e.message)
            .with_context(format!("Validating {}", path.display()))
    })?;

    Ok(schema)
}
