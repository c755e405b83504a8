//! Gradle build script rendering
//!
//! Turns a resolved [`BuildConfig`] back into the module's Kotlin DSL script
//! and the `flutter.*` properties it reads. Nothing here runs Gradle.

use crate::build_config::BuildConfig;
use crate::defaults::{
    COMPILE_SDK_KEY, MIN_SDK_KEY, TARGET_SDK_KEY, VERSION_CODE_KEY, VERSION_NAME_KEY,
};
use crate::signing::DEBUG;
use std::fmt::Write;

/// Render `build.gradle.kts` with every value inlined
pub fn render_build_script(config: &BuildConfig) -> String {
    let mut out = String::new();
    let java = config.java_compatibility().gradle_constant();

    out.push_str("plugins {\n");
    for plugin in config.plugins() {
        let _ = writeln!(out, "    id(\"{}\")", escape(plugin));
    }
    out.push_str("}\n\n");

    out.push_str("android {\n");
    let _ = writeln!(out, "    namespace = \"{}\"", escape(config.namespace()));
    let _ = writeln!(out, "    compileSdk = {}", config.compile_sdk());
    let _ = writeln!(out, "    ndkVersion = \"{}\"", escape(config.ndk_version()));
    out.push('\n');

    out.push_str("    compileOptions {\n");
    let _ = writeln!(out, "        sourceCompatibility = JavaVersion.{java}");
    let _ = writeln!(out, "        targetCompatibility = JavaVersion.{java}");
    let _ = writeln!(
        out,
        "        isCoreLibraryDesugaringEnabled = {}",
        config.desugaring_enabled()
    );
    out.push_str("    }\n\n");

    out.push_str("    kotlinOptions {\n");
    let _ = writeln!(out, "        jvmTarget = JavaVersion.{java}.toString()");
    out.push_str("    }\n\n");

    out.push_str("    defaultConfig {\n");
    let _ = writeln!(
        out,
        "        applicationId = \"{}\"",
        escape(config.application_id())
    );
    let _ = writeln!(out, "        minSdk = {}", config.min_sdk());
    let _ = writeln!(out, "        targetSdk = {}", config.target_sdk());
    let _ = writeln!(out, "        versionCode = {}", config.version_code());
    let _ = writeln!(out, "        versionName = \"{}\"", escape(config.version_name()));
    out.push_str("    }\n\n");

    if !config.signing_configs().is_empty() {
        out.push_str("    signingConfigs {\n");
        for (name, signing) in config.signing_configs() {
            let _ = writeln!(out, "        create(\"{}\") {{", escape(name));
            if let Some(store_file) = &signing.store_file {
                let _ = writeln!(
                    out,
                    "            storeFile = file(\"{}\")",
                    escape(&store_file.to_string_lossy())
                );
            }
            if let Some(key_alias) = &signing.key_alias {
                let _ = writeln!(out, "            keyAlias = \"{}\"", escape(key_alias));
            }
            out.push_str("        }\n");
        }
        out.push_str("    }\n\n");
    }

    out.push_str("    buildTypes {\n");
    let declared = config.build_types().iter().filter(|(name, signing)| {
        // the implicit debug -> debug pairing is AGP's default, nothing to write
        !(name.as_str() == DEBUG && signing.as_str() == DEBUG)
    });
    for (name, signing) in declared {
        let _ = writeln!(out, "        getByName(\"{}\") {{", escape(name));
        let _ = writeln!(
            out,
            "            signingConfig = signingConfigs.getByName(\"{}\")",
            escape(signing)
        );
        out.push_str("        }\n");
    }
    out.push_str("    }\n");
    out.push_str("}\n\n");

    out.push_str("flutter {\n");
    let _ = writeln!(out, "    source = \"{}\"", escape(config.flutter_source()));
    out.push_str("}\n\n");

    out.push_str("dependencies {\n");
    for dep in config.dependencies() {
        let _ = writeln!(out, "    {dep}");
    }
    out.push_str("}\n");

    out
}

/// Render the `flutter.*` entries of `local.properties`
pub fn render_local_properties(config: &BuildConfig) -> String {
    [
        (COMPILE_SDK_KEY, config.compile_sdk().to_string()),
        (MIN_SDK_KEY, config.min_sdk().to_string()),
        (TARGET_SDK_KEY, config.target_sdk().to_string()),
        (VERSION_CODE_KEY, config.version_code().to_string()),
        (VERSION_NAME_KEY, config.version_name().to_string()),
    ]
    .iter()
    .fold(String::new(), |mut out, (key, value)| {
        let _ = writeln!(out, "{key}={}", escape_property(value));
        out
    })
}

/// Kotlin string literal contents
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}

/// `.properties` value: backslashes and leading blanks are significant on read
fn escape_property(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\");
    let body = escaped.trim_start();
    let mut out = String::with_capacity(escaped.len() + 2);
    for blank in escaped[..escaped.len() - body.len()].chars() {
        out.push('\\');
        out.push(blank);
    }
    out.push_str(body);
    out
}
