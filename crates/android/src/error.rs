use crate::java::JavaVersion;
use chores_core::error::{Error, ErrorCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Reasons a build configuration cannot be resolved.
///
/// Every variant is a static mistake in the declarations or the umbrella
/// defaults, so none of them is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Build type '{build_type}' references unknown signing config '{name}' (known: {known})")]
    UnresolvedSigningRef {
        build_type: String,
        name: String,
        known: String,
    },

    #[error("Build type '{0}' is not declared")]
    MissingBuildType(String),

    #[error("Java level mismatch: sourceCompatibility is {source_level}, {setting} is {target_level}")]
    MismatchedJavaLevel {
        source_level: JavaVersion,
        target_level: JavaVersion,
        setting: &'static str,
    },

    #[error("Malformed {field}: '{value}' is not a dotted identifier")]
    MalformedApplicationId { field: &'static str, value: String },

    #[error("Missing required default: {0}")]
    MissingDefault(&'static str),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidDefault { key: String, value: String },

    #[error("SDK levels out of order: minSdk {min_sdk} <= targetSdk {target_sdk} <= compileSdk {compile_sdk} does not hold")]
    SdkOrdering {
        min_sdk: u32,
        target_sdk: u32,
        compile_sdk: u32,
    },

    #[error("Malformed dependency '{coordinate}': {reason}")]
    MalformedDependency { coordinate: String, reason: String },

    #[error("Core library desugaring is {state} but {count} coreLibraryDesugaring dependencies are declared")]
    DesugaringMismatch { state: &'static str, count: usize },

    #[error("Malformed plugin id '{0}'")]
    MalformedPluginId(String),

    #[error("Plugin '{plugin}' must be applied after '{after}'")]
    PluginOrder { plugin: String, after: String },

    #[error("Malformed ndkVersion '{0}'")]
    MalformedNdkVersion(String),
}

impl ConfigurationError {
    /// Workspace error code for this reason
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedSigningRef { .. } | Self::MissingBuildType(_) => {
                ErrorCode::UnresolvedSigningRef
            }
            Self::MismatchedJavaLevel { .. } => ErrorCode::MismatchedJavaLevel,
            Self::MalformedApplicationId { .. } => ErrorCode::MalformedApplicationId,
            Self::MissingDefault(_) => ErrorCode::MissingDefault,
            Self::InvalidDefault { .. } => ErrorCode::InvalidDefault,
            Self::SdkOrdering { .. } => ErrorCode::SdkOrdering,
            Self::MalformedDependency { .. } => ErrorCode::MalformedDependency,
            Self::DesugaringMismatch { .. } => ErrorCode::DesugaringMismatch,
            Self::MalformedPluginId(_) | Self::PluginOrder { .. } => ErrorCode::PluginOrder,
            Self::MalformedNdkVersion(_) => ErrorCode::BuildConfigError,
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnresolvedSigningRef { .. } => {
                Some("Declare the signing config or point the build type at 'debug'")
            }
            Self::MismatchedJavaLevel { .. } => {
                Some("Use the same JavaVersion for source, target and jvmTarget")
            }
            Self::MissingDefault(_) => {
                Some("Run `flutter pub get` to regenerate local.properties, or pass the value explicitly")
            }
            Self::SdkOrdering { .. } => Some("Raise compileSdk or lower minSdk/targetSdk"),
            Self::DesugaringMismatch { .. } => Some(
                "Add coreLibraryDesugaring(\"com.android.tools:desugar_jdk_libs:<version>\") or disable desugaring",
            ),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        let mut out = Error::build_config(err.code(), err.to_string());
        if let Some(suggestion) = err.suggestion() {
            out = out.with_suggestion(suggestion);
        }
        out.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_reference() {
        let err = ConfigurationError::UnresolvedSigningRef {
            build_type: "release".to_string(),
            name: "ci".to_string(),
            known: "debug".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'ci'"));
        assert!(msg.contains("known: debug"));
    }

    #[test]
    fn test_into_core_error() {
        let err: Error = ConfigurationError::MismatchedJavaLevel {
            source_level: JavaVersion::Java11,
            target_level: JavaVersion::Java17,
            setting: "targetCompatibility",
        }
        .into();

        assert_eq!(err.code, ErrorCode::MismatchedJavaLevel);
        assert!(err.message.contains("sourceCompatibility is 11"));
        assert!(err.suggestion.is_some());
        assert!(err.source.is_some());
    }

    #[test]
    fn test_missing_default_code() {
        let err = ConfigurationError::MissingDefault("versionCode");
        assert_eq!(err.code(), ErrorCode::MissingDefault);
        assert_eq!(err.to_string(), "Missing required default: versionCode");
    }
}
