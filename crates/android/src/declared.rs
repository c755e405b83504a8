//! The declared half of the module build script
//!
//! Everything the app module states literally: identifiers, the NDK pin,
//! Java levels, plugins, build types, signing configs and dependencies.
//! SDK levels and version code/name are not here; they come from the
//! umbrella project (see [`crate::defaults`]).

use crate::dependency::{DependencyDecl, CORE_LIBRARY_DESUGARING};
use crate::java::JavaVersion;
use crate::signing::{BuildTypeDecl, SigningTable, DEBUG, RELEASE};
use chores_core::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ANDROID_APPLICATION_PLUGIN: &str = "com.android.application";
pub const KOTLIN_ANDROID_PLUGIN: &str = "kotlin-android";
pub const FLUTTER_GRADLE_PLUGIN: &str = "dev.flutter.flutter-gradle-plugin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    pub source_compatibility: JavaVersion,
    pub target_compatibility: JavaVersion,
    #[serde(default)]
    pub is_core_library_desugaring_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KotlinOptions {
    pub jvm_target: JavaVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlutterBlock {
    /// Umbrella project root, relative to the app module
    pub source: String,
}

impl Default for FlutterBlock {
    fn default() -> Self {
        Self {
            source: "../..".to_string(),
        }
    }
}

/// Static declarations of the Android app module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclaredConfig {
    pub namespace: String,
    pub application_id: String,
    pub ndk_version: String,
    #[serde(default)]
    pub plugins: Vec<String>,
    pub compile_options: CompileOptions,
    pub kotlin_options: KotlinOptions,
    #[serde(default)]
    pub signing_configs: SigningTable,
    #[serde(default)]
    pub build_types: BTreeMap<String, BuildTypeDecl>,
    #[serde(default)]
    pub flutter: FlutterBlock,
    #[serde(default)]
    pub dependencies: Vec<DependencyDecl>,
}

impl DeclaredConfig {
    /// The shipped fragment of the chores app.
    ///
    /// Release builds sign with the debug config. That mirrors the shipped
    /// script and is kept as-is; resolution only warns about it.
    pub fn chores() -> Self {
        Self {
            namespace: "com.example.flutter_application_chores".to_string(),
            application_id: "com.example.flutter_application_chores".to_string(),
            ndk_version: "27.0.12077973".to_string(),
            plugins: vec![
                ANDROID_APPLICATION_PLUGIN.to_string(),
                KOTLIN_ANDROID_PLUGIN.to_string(),
                FLUTTER_GRADLE_PLUGIN.to_string(),
            ],
            compile_options: CompileOptions {
                source_compatibility: JavaVersion::Java11,
                target_compatibility: JavaVersion::Java11,
                is_core_library_desugaring_enabled: true,
            },
            kotlin_options: KotlinOptions {
                jvm_target: JavaVersion::Java11,
            },
            signing_configs: SigningTable::default(),
            build_types: BTreeMap::from([(RELEASE.to_string(), BuildTypeDecl::signed_with(DEBUG))]),
            flutter: FlutterBlock::default(),
            dependencies: vec![DependencyDecl::new(
                CORE_LIBRARY_DESUGARING,
                "com.android.tools:desugar_jdk_libs:2.0.4",
            )],
        }
    }

    /// Parse declarations from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read declarations from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        tracing::debug!(path = %path.display(), "Loading declared fragment");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).context(format!("Parsing {}", path.display()))
    }

    /// Load from `path`, or fall back to [`DeclaredConfig::chores`]
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::chores()),
        }
    }
}
