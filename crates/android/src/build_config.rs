//! Resolution of declarations and umbrella defaults into a build descriptor
//!
//! [`resolve`] is a pure function: identical inputs always produce an equal
//! [`BuildConfig`], and nothing is read from or written to the outside world.
//! The descriptor is handed to the external toolchain unchanged.

use crate::declared::{
    DeclaredConfig, ANDROID_APPLICATION_PLUGIN, FLUTTER_GRADLE_PLUGIN, KOTLIN_ANDROID_PLUGIN,
};
use crate::defaults::Defaults;
use crate::dependency::Dependency;
use crate::error::{ConfigurationError, Result};
use crate::java::JavaVersion;
use crate::signing::{self, SigningConfig, DEBUG, RELEASE};
use chores_core::validation::{is_dotted_identifier, is_dotted_version, is_plugin_id};
use serde::Serialize;
use std::collections::BTreeMap;

/// Kotlin plugin id spelled out in full
const KOTLIN_ANDROID_PLUGIN_ID: &str = "org.jetbrains.kotlin.android";

/// A resolved, immutable build descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    application_id: String,
    namespace: String,
    compile_sdk: u32,
    min_sdk: u32,
    target_sdk: u32,
    ndk_version: String,
    version_code: u32,
    version_name: String,
    java_compatibility: JavaVersion,
    desugaring_enabled: bool,
    signing_ref: String,
    build_types: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    signing_configs: BTreeMap<String, SigningConfig>,
    dependencies: Vec<Dependency>,
    plugins: Vec<String>,
    flutter_source: String,
}

impl BuildConfig {
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn compile_sdk(&self) -> u32 {
        self.compile_sdk
    }

    pub fn min_sdk(&self) -> u32 {
        self.min_sdk
    }

    pub fn target_sdk(&self) -> u32 {
        self.target_sdk
    }

    pub fn ndk_version(&self) -> &str {
        &self.ndk_version
    }

    pub fn version_code(&self) -> u32 {
        self.version_code
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    /// Shared source, target and jvmTarget level
    pub fn java_compatibility(&self) -> JavaVersion {
        self.java_compatibility
    }

    pub fn desugaring_enabled(&self) -> bool {
        self.desugaring_enabled
    }

    /// Signing config the release build type signs with
    pub fn signing_ref(&self) -> &str {
        &self.signing_ref
    }

    /// Build type name to signing config name
    pub fn build_types(&self) -> &BTreeMap<String, String> {
        &self.build_types
    }

    /// Signing configs referenced by a build type, except the built-in `debug`
    pub fn signing_configs(&self) -> &BTreeMap<String, SigningConfig> {
        &self.signing_configs
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn flutter_source(&self) -> &str {
        &self.flutter_source
    }

    /// Release artifacts are signed with the debug keystore
    pub fn release_uses_debug_signing(&self) -> bool {
        self.signing_ref == DEBUG
    }
}

/// Resolve declarations against the umbrella defaults.
///
/// Checks run in a fixed order and the first failure is returned.
pub fn resolve(declared: &DeclaredConfig, defaults: &Defaults) -> Result<BuildConfig> {
    check_identifier("applicationId", &declared.application_id)?;
    check_identifier("namespace", &declared.namespace)?;

    if !is_dotted_version(&declared.ndk_version) {
        return Err(ConfigurationError::MalformedNdkVersion(
            declared.ndk_version.clone(),
        ));
    }

    let compile_sdk = defaults
        .compile_sdk
        .ok_or(ConfigurationError::MissingDefault("compileSdk"))?;
    let min_sdk = defaults
        .min_sdk
        .ok_or(ConfigurationError::MissingDefault("minSdk"))?;
    let target_sdk = defaults
        .target_sdk
        .ok_or(ConfigurationError::MissingDefault("targetSdk"))?;
    let version_code = defaults
        .version_code
        .ok_or(ConfigurationError::MissingDefault("versionCode"))?;
    if version_code == 0 {
        return Err(ConfigurationError::InvalidDefault {
            key: "versionCode".to_string(),
            value: "0".to_string(),
        });
    }
    let version_name = defaults
        .version_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or(ConfigurationError::MissingDefault("versionName"))?;

    if !(min_sdk <= target_sdk && target_sdk <= compile_sdk) {
        return Err(ConfigurationError::SdkOrdering {
            min_sdk,
            target_sdk,
            compile_sdk,
        });
    }

    let java_compatibility = check_java_levels(declared)?;

    let build_types = signing::resolve_build_types(&declared.build_types, &declared.signing_configs)?;
    let signing_ref = build_types[RELEASE].clone();
    let signing_configs = build_types
        .values()
        .filter(|name| name.as_str() != DEBUG)
        .filter_map(|name| {
            declared
                .signing_configs
                .get(name)
                .map(|entry| (name.clone(), entry.clone()))
        })
        .collect();

    let dependencies = declared
        .dependencies
        .iter()
        .map(Dependency::parse)
        .collect::<Result<Vec<_>>>()?;
    let desugaring_enabled = declared.compile_options.is_core_library_desugaring_enabled;
    check_desugaring(desugaring_enabled, &dependencies)?;

    check_plugins(&declared.plugins)?;

    let config = BuildConfig {
        application_id: declared.application_id.clone(),
        namespace: declared.namespace.clone(),
        compile_sdk,
        min_sdk,
        target_sdk,
        ndk_version: declared.ndk_version.clone(),
        version_code,
        version_name,
        java_compatibility,
        desugaring_enabled,
        signing_ref,
        build_types,
        signing_configs,
        dependencies,
        plugins: declared.plugins.clone(),
        flutter_source: declared.flutter.source.clone(),
    };

    if config.release_uses_debug_signing() {
        tracing::info!(
            application_id = %config.application_id,
            "Release build type signs with the debug signing config"
        );
    }
    tracing::debug!(
        application_id = %config.application_id,
        compile_sdk,
        min_sdk,
        target_sdk,
        version_code,
        "Resolved build configuration"
    );

    Ok(config)
}

fn check_identifier(field: &'static str, value: &str) -> Result<()> {
    if is_dotted_identifier(value) {
        Ok(())
    } else {
        Err(ConfigurationError::MalformedApplicationId {
            field,
            value: value.to_string(),
        })
    }
}

fn check_java_levels(declared: &DeclaredConfig) -> Result<JavaVersion> {
    let source_level = declared.compile_options.source_compatibility;

    for (setting, level) in [
        ("targetCompatibility", declared.compile_options.target_compatibility),
        ("kotlinOptions.jvmTarget", declared.kotlin_options.jvm_target),
    ] {
        if level != source_level {
            return Err(ConfigurationError::MismatchedJavaLevel {
                source_level,
                target_level: level,
                setting,
            });
        }
    }

    Ok(source_level)
}

fn check_desugaring(enabled: bool, dependencies: &[Dependency]) -> Result<()> {
    let count = dependencies.iter().filter(|d| d.is_desugaring()).count();
    match (enabled, count) {
        (true, 0) => Err(ConfigurationError::DesugaringMismatch {
            state: "enabled",
            count,
        }),
        (false, n) if n > 0 => Err(ConfigurationError::DesugaringMismatch {
            state: "disabled",
            count,
        }),
        _ => Ok(()),
    }
}

/// The Flutter plugin must be applied after the Android and Kotlin plugins
fn check_plugins(plugins: &[String]) -> Result<()> {
    if let Some(bad) = plugins.iter().find(|p| !is_plugin_id(p)) {
        return Err(ConfigurationError::MalformedPluginId(bad.clone()));
    }

    let Some(flutter_at) = plugins.iter().position(|p| p == FLUTTER_GRADLE_PLUGIN) else {
        return Ok(());
    };

    let must_precede = [
        ANDROID_APPLICATION_PLUGIN,
        KOTLIN_ANDROID_PLUGIN,
        KOTLIN_ANDROID_PLUGIN_ID,
    ];
    if let Some(late) = plugins[flutter_at + 1..]
        .iter()
        .find(|p| must_precede.contains(&p.as_str()))
    {
        return Err(ConfigurationError::PluginOrder {
            plugin: FLUTTER_GRADLE_PLUGIN.to_string(),
            after: late.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{DependencyDecl, CORE_LIBRARY_DESUGARING};
    use crate::signing::BuildTypeDecl;
    use proptest::prelude::*;

    fn defaults() -> Defaults {
        Defaults::new(34, 21, 34, 3, "1.2.0")
    }

    #[test]
    fn test_resolves_shipped_fragment() {
        let config = resolve(&DeclaredConfig::chores(), &defaults()).unwrap();

        assert_eq!(config.application_id(), "com.example.flutter_application_chores");
        assert!(config.desugaring_enabled());
        let deps: Vec<(&str, &str)> = config
            .dependencies()
            .iter()
            .map(|d| (d.name(), d.version()))
            .collect();
        assert_eq!(deps, vec![("desugar_jdk_libs", "2.0.4")]);

        assert_eq!(config.compile_sdk(), 34);
        assert_eq!(config.min_sdk(), 21);
        assert_eq!(config.target_sdk(), 34);
        assert_eq!(config.version_code(), 3);
        assert_eq!(config.version_name(), "1.2.0");
        assert_eq!(config.ndk_version(), "27.0.12077973");
        assert_eq!(config.java_compatibility(), JavaVersion::Java11);
        assert_eq!(config.flutter_source(), "../..");
    }

    #[test]
    fn test_release_signs_with_debug() {
        let config = resolve(&DeclaredConfig::chores(), &defaults()).unwrap();
        assert_eq!(config.signing_ref(), DEBUG);
        assert!(config.release_uses_debug_signing());
        assert_eq!(config.build_types()[RELEASE], DEBUG);
        assert!(config.signing_configs().is_empty());
    }

    #[test]
    fn test_referenced_signing_configs_carried() {
        let mut declared = DeclaredConfig::chores();
        let upload = SigningConfig {
            store_file: Some("keys/upload.jks".into()),
            key_alias: Some("upload".to_string()),
        };
        declared.signing_configs.insert("upload", upload.clone());
        declared.signing_configs.insert("unused", SigningConfig::default());
        declared
            .build_types
            .insert(RELEASE.to_string(), BuildTypeDecl::signed_with("upload"));

        let config = resolve(&declared, &defaults()).unwrap();
        assert!(!config.release_uses_debug_signing());
        assert_eq!(
            config.signing_configs().keys().collect::<Vec<_>>(),
            vec!["upload"]
        );
        assert_eq!(config.signing_configs()["upload"], upload);
    }

    #[test]
    fn test_unknown_signing_ref_fails() {
        let mut declared = DeclaredConfig::chores();
        declared
            .build_types
            .insert(RELEASE.to_string(), BuildTypeDecl::signed_with("ci"));

        let err = resolve(&declared, &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnresolvedSigningRef { ref name, .. } if name == "ci"
        ));
    }

    #[test]
    fn test_mismatched_java_levels_fail() {
        let mut declared = DeclaredConfig::chores();
        declared.compile_options.target_compatibility = JavaVersion::Java17;

        let err = resolve(&declared, &defaults()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MismatchedJavaLevel {
                source_level: JavaVersion::Java11,
                target_level: JavaVersion::Java17,
                setting: "targetCompatibility",
            }
        );
    }

    #[test]
    fn test_mismatched_jvm_target_fails() {
        let mut declared = DeclaredConfig::chores();
        declared.kotlin_options.jvm_target = JavaVersion::Java17;

        let err = resolve(&declared, &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MismatchedJavaLevel { setting: "kotlinOptions.jvmTarget", .. }
        ));
    }

    #[test]
    fn test_malformed_application_id() {
        for bad in ["", "chores", "com.example.", "com.example.flutter-chores"] {
            let mut declared = DeclaredConfig::chores();
            declared.application_id = bad.to_string();
            let err = resolve(&declared, &defaults()).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::MalformedApplicationId { field: "applicationId", .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_defaults_reported_by_name() {
        let mut partial = defaults();
        partial.version_code = None;
        assert_eq!(
            resolve(&DeclaredConfig::chores(), &partial).unwrap_err(),
            ConfigurationError::MissingDefault("versionCode")
        );

        let mut blank_name = defaults();
        blank_name.version_name = Some("  ".to_string());
        assert_eq!(
            resolve(&DeclaredConfig::chores(), &blank_name).unwrap_err(),
            ConfigurationError::MissingDefault("versionName")
        );

        assert_eq!(
            resolve(&DeclaredConfig::chores(), &Defaults::default()).unwrap_err(),
            ConfigurationError::MissingDefault("compileSdk")
        );
    }

    #[test]
    fn test_sdk_ordering_violation() {
        let err = resolve(&DeclaredConfig::chores(), &Defaults::new(33, 21, 34, 1, "1.0.0")).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::SdkOrdering {
                min_sdk: 21,
                target_sdk: 34,
                compile_sdk: 33,
            }
        );
    }

    #[test]
    fn test_desugaring_without_dependency() {
        let mut declared = DeclaredConfig::chores();
        declared.dependencies.clear();
        let err = resolve(&declared, &defaults()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DesugaringMismatch {
                state: "enabled",
                count: 0
            }
        );
    }

    #[test]
    fn test_desugaring_dependency_while_disabled() {
        let mut declared = DeclaredConfig::chores();
        declared.compile_options.is_core_library_desugaring_enabled = false;
        let err = resolve(&declared, &defaults()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::DesugaringMismatch { state: "disabled", count: 1 }
        ));
    }

    #[test]
    fn test_malformed_dependency() {
        let mut declared = DeclaredConfig::chores();
        declared
            .dependencies
            .push(DependencyDecl::new("implementation", "androidx.core:core-ktx"));
        let err = resolve(&declared, &defaults()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedDependency { .. }));
    }

    #[test]
    fn test_flutter_plugin_must_come_last() {
        let mut declared = DeclaredConfig::chores();
        declared.plugins = vec![
            ANDROID_APPLICATION_PLUGIN.to_string(),
            FLUTTER_GRADLE_PLUGIN.to_string(),
            KOTLIN_ANDROID_PLUGIN.to_string(),
        ];
        let err = resolve(&declared, &defaults()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::PluginOrder {
                plugin: FLUTTER_GRADLE_PLUGIN.to_string(),
                after: KOTLIN_ANDROID_PLUGIN.to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_ndk_version() {
        let mut declared = DeclaredConfig::chores();
        declared.ndk_version = "r27".to_string();
        assert_eq!(
            resolve(&declared, &defaults()).unwrap_err(),
            ConfigurationError::MalformedNdkVersion("r27".to_string())
        );
    }

    #[test]
    fn test_extra_desugaring_entry_still_resolves() {
        let mut declared = DeclaredConfig::chores();
        declared.dependencies.push(DependencyDecl::new(
            CORE_LIBRARY_DESUGARING,
            "com.android.tools:desugar_jdk_libs_nio:2.0.4",
        ));
        let config = resolve(&declared, &defaults()).unwrap();
        assert_eq!(config.dependencies().len(), 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let config = resolve(&DeclaredConfig::chores(), &defaults()).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["applicationId"], "com.example.flutter_application_chores");
        assert_eq!(json["javaCompatibility"], "11");
        assert_eq!(json["signingRef"], "debug");
        assert_eq!(json["dependencies"][0]["name"], "desugar_jdk_libs");
    }

    proptest! {
        #[test]
        fn resolve_is_idempotent(
            compile in 1u32..40,
            min in 1u32..40,
            target in 1u32..40,
            code in 1u32..10_000,
        ) {
            let defaults = Defaults::new(compile, min, target, code, "1.0.0");
            let declared = DeclaredConfig::chores();
            prop_assert_eq!(resolve(&declared, &defaults), resolve(&declared, &defaults));
        }

        #[test]
        fn resolved_sdk_levels_are_ordered(
            compile in 1u32..40,
            min in 1u32..40,
            target in 1u32..40,
        ) {
            let defaults = Defaults::new(compile, min, target, 1, "1.0.0");
            match resolve(&DeclaredConfig::chores(), &defaults) {
                Ok(config) => {
                    prop_assert!(config.min_sdk() <= config.target_sdk());
                    prop_assert!(config.target_sdk() <= config.compile_sdk());
                }
                Err(err) => {
                    prop_assert!(min > target || target > compile);
                    let is_ordering = matches!(err, ConfigurationError::SdkOrdering { .. });
                    prop_assert!(is_ordering);
                }
            }
        }
    }
}
