//! Dependency coordinates handed to the external resolver
//!
//! Only the shape of a coordinate is checked here. Whether the artifact
//! exists is the dependency resolver's problem.

use crate::error::{ConfigurationError, Result};
use chores_core::validation::is_artifact_part;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration name for the desugaring shim
pub const CORE_LIBRARY_DESUGARING: &str = "coreLibraryDesugaring";

const KNOWN_CONFIGURATIONS: [&str; 6] = [
    "implementation",
    "api",
    "compileOnly",
    "runtimeOnly",
    "testImplementation",
    CORE_LIBRARY_DESUGARING,
];

/// A dependency as written in the declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDecl {
    pub configuration: String,
    /// `group:name:version`
    pub coordinate: String,
}

impl DependencyDecl {
    pub fn new(configuration: impl Into<String>, coordinate: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            coordinate: coordinate.into(),
        }
    }
}

/// A validated `group:name:version` coordinate bound to a configuration
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    configuration: String,
    group: String,
    name: String,
    version: String,
}

impl Dependency {
    /// Parse and shape-check a declared dependency
    pub fn parse(decl: &DependencyDecl) -> Result<Self> {
        let malformed = |reason: &str| ConfigurationError::MalformedDependency {
            coordinate: decl.coordinate.clone(),
            reason: reason.to_string(),
        };

        if !KNOWN_CONFIGURATIONS.contains(&decl.configuration.as_str()) {
            return Err(malformed(&format!(
                "unknown configuration '{}'",
                decl.configuration
            )));
        }

        let parts: Vec<&str> = decl.coordinate.split(':').collect();
        let [group, name, version] = parts.as_slice() else {
            return Err(malformed("expected group:name:version"));
        };

        for (label, part) in [("group", group), ("name", name), ("version", version)] {
            if part.is_empty() {
                return Err(malformed(&format!("empty {label}")));
            }
            if !is_artifact_part(part) {
                return Err(malformed(&format!("invalid characters in {label}")));
            }
        }

        Ok(Self {
            configuration: decl.configuration.clone(),
            group: (*group).to_string(),
            name: (*name).to_string(),
            version: (*version).to_string(),
        })
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_desugaring(&self) -> bool {
        self.configuration == CORE_LIBRARY_DESUGARING
    }

    /// `group:name:version`
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.version)
    }
}

/// Gradle dependency notation, e.g. `coreLibraryDesugaring("a:b:1.0")`
impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(\"{}\")", self.configuration, self.coordinate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_desugar_libs() {
        let dep = Dependency::parse(&DependencyDecl::new(
            CORE_LIBRARY_DESUGARING,
            "com.android.tools:desugar_jdk_libs:2.0.4",
        ))
        .unwrap();

        assert_eq!(dep.group(), "com.android.tools");
        assert_eq!(dep.name(), "desugar_jdk_libs");
        assert_eq!(dep.version(), "2.0.4");
        assert!(dep.is_desugaring());
        assert_eq!(
            dep.to_string(),
            "coreLibraryDesugaring(\"com.android.tools:desugar_jdk_libs:2.0.4\")"
        );
    }

    #[test]
    fn test_missing_version_rejected() {
        let err = Dependency::parse(&DependencyDecl::new("implementation", "a.b:c")).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedDependency { .. }));
    }

    #[test]
    fn test_empty_part_rejected() {
        let err = Dependency::parse(&DependencyDecl::new("implementation", "a.b::1.0")).unwrap_err();
        assert!(err.to_string().contains("empty name"));
    }

    #[test]
    fn test_unknown_configuration_rejected() {
        let err = Dependency::parse(&DependencyDecl::new("kapt", "a:b:1")).unwrap_err();
        assert!(err.to_string().contains("unknown configuration 'kapt'"));
    }

    #[test]
    fn test_whitespace_rejected() {
        let res = Dependency::parse(&DependencyDecl::new("implementation", "a:b c:1"));
        assert!(res.is_err());
    }
}
