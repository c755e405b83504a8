//! Signing configurations and the build types that reference them
//!
//! The Android Gradle plugin always provides a `debug` signing config backed
//! by the per-user debug keystore, so the table is never empty.

use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEBUG: &str = "debug";
pub const RELEASE: &str = "release";

/// A named credential set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
}

/// Signing configs by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, SigningConfig>", into = "BTreeMap<String, SigningConfig>")]
pub struct SigningTable {
    entries: BTreeMap<String, SigningConfig>,
}

impl Default for SigningTable {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<String, SigningConfig>> for SigningTable {
    fn from(mut entries: BTreeMap<String, SigningConfig>) -> Self {
        entries.entry(DEBUG.to_string()).or_default();
        Self { entries }
    }
}

impl From<SigningTable> for BTreeMap<String, SigningConfig> {
    fn from(table: SigningTable) -> Self {
        table.entries
    }
}

impl SigningTable {
    /// Add or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, config: SigningConfig) {
        self.entries.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&SigningConfig> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Look up the entry a build type points at
    pub fn resolve(&self, build_type: &str, name: &str) -> Result<&SigningConfig> {
        self.entries
            .get(name)
            .ok_or_else(|| ConfigurationError::UnresolvedSigningRef {
                build_type: build_type.to_string(),
                name: name.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}

/// Declared settings of one build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTypeDecl {
    /// Name of the signing config this build type signs with
    pub signing_config: String,
}

impl BuildTypeDecl {
    pub fn signed_with(name: impl Into<String>) -> Self {
        Self {
            signing_config: name.into(),
        }
    }
}

/// Resolve every build type to a signing config name.
///
/// `debug` is implicit and signs with the debug config unless redeclared.
/// `release` must be declared, since the resolved descriptor exports its
/// reference.
pub fn resolve_build_types(
    declared: &BTreeMap<String, BuildTypeDecl>,
    table: &SigningTable,
) -> Result<BTreeMap<String, String>> {
    let mut resolved = BTreeMap::new();
    resolved.insert(DEBUG.to_string(), DEBUG.to_string());

    for (build_type, decl) in declared {
        table.resolve(build_type, &decl.signing_config)?;
        resolved.insert(build_type.clone(), decl.signing_config.clone());
    }

    if !resolved.contains_key(RELEASE) {
        return Err(ConfigurationError::MissingBuildType(RELEASE.to_string()));
    }

    Ok(resolved)
}
