//! Defaults supplied by the umbrella Flutter project
//!
//! SDK levels and the version code/name are not declared by the module. They
//! are layered from, lowest to highest precedence:
//!
//! 1. the SDK levels the Flutter Gradle plugin ships with
//! 2. `flutter.*` keys in `local.properties`
//! 3. the `version:` line of `pubspec.yaml` (`1.2.0+3`)
//! 4. explicit overrides

use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const COMPILE_SDK_KEY: &str = "flutter.compileSdkVersion";
pub const MIN_SDK_KEY: &str = "flutter.minSdkVersion";
pub const TARGET_SDK_KEY: &str = "flutter.targetSdkVersion";
pub const VERSION_CODE_KEY: &str = "flutter.versionCode";
pub const VERSION_NAME_KEY: &str = "flutter.versionName";

/// Levels the Flutter Gradle plugin falls back to
const FLUTTER_COMPILE_SDK: u32 = 35;
const FLUTTER_MIN_SDK: u32 = 21;
const FLUTTER_TARGET_SDK: u32 = 35;

/// Environment-provided default table. Any entry may be missing until resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    pub compile_sdk: Option<u32>,
    pub min_sdk: Option<u32>,
    pub target_sdk: Option<u32>,
    pub version_code: Option<u32>,
    pub version_name: Option<String>,
}

impl Defaults {
    /// A fully populated table
    pub fn new(
        compile_sdk: u32,
        min_sdk: u32,
        target_sdk: u32,
        version_code: u32,
        version_name: impl Into<String>,
    ) -> Self {
        Self {
            compile_sdk: Some(compile_sdk),
            min_sdk: Some(min_sdk),
            target_sdk: Some(target_sdk),
            version_code: Some(version_code),
            version_name: Some(version_name.into()),
        }
    }

    /// SDK levels of the Flutter Gradle plugin; no version code or name
    pub fn flutter_sdk() -> Self {
        Self {
            compile_sdk: Some(FLUTTER_COMPILE_SDK),
            min_sdk: Some(FLUTTER_MIN_SDK),
            target_sdk: Some(FLUTTER_TARGET_SDK),
            ..Self::default()
        }
    }

    /// Layer `other` on top of `self`; entries present in `other` win
    #[must_use]
    pub fn overlay(self, other: Defaults) -> Self {
        Self {
            compile_sdk: other.compile_sdk.or(self.compile_sdk),
            min_sdk: other.min_sdk.or(self.min_sdk),
            target_sdk: other.target_sdk.or(self.target_sdk),
            version_code: other.version_code.or(self.version_code),
            version_name: other.version_name.or(self.version_name),
        }
    }

    /// Read `flutter.*` entries from `local.properties` content
    pub fn from_properties(content: &str) -> Result<Self> {
        let mut defaults = Self::default();
        for (key, value) in parse_properties(content) {
            match key.as_str() {
                COMPILE_SDK_KEY => defaults.compile_sdk = Some(parse_level(&key, &value)?),
                MIN_SDK_KEY => defaults.min_sdk = Some(parse_level(&key, &value)?),
                TARGET_SDK_KEY => defaults.target_sdk = Some(parse_level(&key, &value)?),
                VERSION_CODE_KEY => defaults.version_code = Some(parse_level(&key, &value)?),
                VERSION_NAME_KEY if !value.is_empty() => defaults.version_name = Some(value),
                _ => {}
            }
        }
        Ok(defaults)
    }

    /// Read the `version:` line of a pubspec
    ///
    /// `1.2.0+3` yields version name `1.2.0` and code `3`. Without a build
    /// number only the name is set.
    pub fn from_pubspec(content: &str) -> Result<Self> {
        let Some(raw) = pubspec_version(content) else {
            return Ok(Self::default());
        };

        let version = semver::Version::parse(&raw).map_err(|_| ConfigurationError::InvalidDefault {
            key: "pubspec version".to_string(),
            value: raw.clone(),
        })?;

        let version_code = if version.build.is_empty() {
            None
        } else {
            Some(parse_level("pubspec build number", version.build.as_str())?)
        };

        let mut name = version;
        name.build = semver::BuildMetadata::EMPTY;

        Ok(Self {
            version_code,
            version_name: Some(name.to_string()),
            ..Self::default()
        })
    }

    /// Load every layer found under `umbrella_root`.
    ///
    /// Missing files are skipped; unreadable or malformed ones are errors.
    pub fn load(
        umbrella_root: &Path,
        properties_file: &str,
        pubspec_file: &str,
    ) -> chores_core::Result<Self> {
        let mut defaults = Self::flutter_sdk();

        let properties = umbrella_root.join(properties_file);
        if let Some(content) = read_optional(&properties)? {
            tracing::debug!(path = %properties.display(), "Reading umbrella properties");
            defaults = defaults.overlay(Self::from_properties(&content)?);
        }

        let pubspec = umbrella_root.join(pubspec_file);
        if let Some(content) = read_optional(&pubspec)? {
            tracing::debug!(path = %pubspec.display(), "Reading umbrella pubspec");
            defaults = defaults.overlay(Self::from_pubspec(&content)?);
        }

        Ok(defaults)
    }
}

fn read_optional(path: &Path) -> chores_core::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Umbrella file not present, skipping");
            Ok(None)
        }
        Err(e) => Err(chores_core::Error::from(e).with_context(format!("Reading {}", path.display()))),
    }
}

fn parse_level(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigurationError::InvalidDefault {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Minimal `.properties` reader: `key=value` or `key: value`, `#`/`!` comments
fn parse_properties(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split = line.find(['=', ':'])?;
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            Some((unescape(key), unescape(value)))
        })
        .collect()
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Top-level `version:` value, unquoted and without trailing comment
fn pubspec_version(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.strip_prefix("version:")?;
        let value = rest.split('#').next().unwrap_or("").trim();
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LOCAL_PROPERTIES: &str = "\
sdk.dir=C\\:\\\\Android\\\\sdk
flutter.sdk=/opt/flutter
# written by flutter pub get
flutter.buildMode=release
flutter.versionName=1.2.0
flutter.versionCode=3
";

    const PUBSPEC: &str = "\
name: flutter_application_chores
description: \"Chores app\"
publish_to: 'none'
version: 1.3.0+7 # bump on release

environment:
  sdk: ^3.5.0
";

    #[test]
    fn test_from_properties() {
        let defaults = Defaults::from_properties(LOCAL_PROPERTIES).unwrap();
        assert_eq!(defaults.version_name.as_deref(), Some("1.2.0"));
        assert_eq!(defaults.version_code, Some(3));
        assert_eq!(defaults.min_sdk, None);
    }

    #[test]
    fn test_properties_escape_and_colon() {
        let props = parse_properties("sdk.dir=C\\:\\\\sdk\nflutter.minSdkVersion: 23\n");
        assert_eq!(props[0], ("sdk.dir".to_string(), "C:\\sdk".to_string()));
        assert_eq!(props[1], (MIN_SDK_KEY.to_string(), "23".to_string()));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let err = Defaults::from_properties("flutter.versionCode=three\n").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidDefault {
                key: VERSION_CODE_KEY.to_string(),
                value: "three".to_string(),
            }
        );
        assert!(Defaults::from_properties("flutter.minSdkVersion=0\n").is_err());
    }

    #[test]
    fn test_from_pubspec() {
        let defaults = Defaults::from_pubspec(PUBSPEC).unwrap();
        assert_eq!(defaults.version_name.as_deref(), Some("1.3.0"));
        assert_eq!(defaults.version_code, Some(7));
    }

    #[test]
    fn test_pubspec_without_build_number() {
        let defaults = Defaults::from_pubspec("version: \"2.0.0-beta.1\"\n").unwrap();
        assert_eq!(defaults.version_name.as_deref(), Some("2.0.0-beta.1"));
        assert_eq!(defaults.version_code, None);
    }

    #[test]
    fn test_pubspec_nested_version_ignored() {
        let defaults = Defaults::from_pubspec("environment:\n  version: 9.9.9\n").unwrap();
        assert_eq!(defaults, Defaults::default());
    }

    #[test]
    fn test_pubspec_malformed_version() {
        let err = Defaults::from_pubspec("version: 1.2\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDefault { .. }));
    }

    #[test]
    fn test_overlay_precedence() {
        let base = Defaults::flutter_sdk();
        let top = Defaults {
            min_sdk: Some(24),
            version_name: Some("1.0.0".to_string()),
            ..Defaults::default()
        };
        let merged = base.overlay(top);
        assert_eq!(merged.min_sdk, Some(24));
        assert_eq!(merged.compile_sdk, Some(35));
        assert_eq!(merged.version_name.as_deref(), Some("1.0.0"));
        assert_eq!(merged.version_code, None);
    }

    #[test]
    fn test_load_layers_pubspec_over_properties() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("android")).unwrap();
        fs::write(dir.path().join("android/local.properties"), LOCAL_PROPERTIES).unwrap();
        fs::write(dir.path().join("pubspec.yaml"), PUBSPEC).unwrap();

        let defaults = Defaults::load(dir.path(), "android/local.properties", "pubspec.yaml").unwrap();
        assert_eq!(defaults.version_name.as_deref(), Some("1.3.0"));
        assert_eq!(defaults.version_code, Some(7));
        assert_eq!(defaults.target_sdk, Some(35));
    }

    #[test]
    fn test_load_missing_files_gives_sdk_only() {
        let dir = TempDir::new().unwrap();
        let defaults = Defaults::load(dir.path(), "android/local.properties", "pubspec.yaml").unwrap();
        assert_eq!(defaults, Defaults::flutter_sdk());
    }
}
