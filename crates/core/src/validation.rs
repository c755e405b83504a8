//! Configuration and input validation
//!
//! Provides validation for:
//! - Tool configuration values
//! - Identifier grammars (application ids, namespaces, plugin ids)
//! - Version strings and dependency coordinates
//!
//! # Example
//!
//! ```rust
//! use chores_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("umbrella.pubspec_file", "pubspec.yaml")
//!     .one_of("output.format", "json", &["human", "json", "gradle"])
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DOTTED_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

static PLUGIN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*(\.[A-Za-z][A-Za-z0-9_-]*)*$").unwrap());

static DOTTED_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)+$").unwrap());

static ARTIFACT_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// Reverse-domain identifier with at least two segments, e.g. `com.example.app`
#[must_use]
pub fn is_dotted_identifier(value: &str) -> bool {
    DOTTED_IDENTIFIER.is_match(value)
}

/// Gradle plugin id, e.g. `kotlin-android` or `dev.flutter.flutter-gradle-plugin`
#[must_use]
pub fn is_plugin_id(value: &str) -> bool {
    PLUGIN_ID.is_match(value)
}

/// Purely numeric dotted version, e.g. `27.0.12077973`
#[must_use]
pub fn is_dotted_version(value: &str) -> bool {
    DOTTED_VERSION.is_match(value)
}

/// One of the `group`, `name` or `version` parts of a Maven coordinate
#[must_use]
pub fn is_artifact_part(value: &str) -> bool {
    ARTIFACT_PART.is_match(value)
}

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    #[must_use]
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    fn fail(
        mut self,
        field: &str,
        message: String,
        code: &str,
        expected: Option<String>,
        actual: Option<String>,
    ) -> Self {
        self.result.add_error(ValidationError {
            field: field.to_string(),
            message,
            code: code.to_string(),
            expected,
            actual,
        });
        self
    }

    /// Validate that a field is not empty
    #[must_use]
    pub fn required(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.fail(
                field,
                "Field is required".to_string(),
                "REQUIRED",
                Some("non-empty value".to_string()),
                Some("empty".to_string()),
            );
        }
        self
    }

    /// Validate that a value is in a list of allowed values
    #[must_use]
    pub fn one_of(self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            return self.fail(
                field,
                format!("Must be one of: {}", allowed.join(", ")),
                "ONE_OF",
                Some(allowed.join(", ")),
                Some(value.to_string()),
            );
        }
        self
    }

    /// Add a warning (non-blocking)
    #[must_use]
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    #[must_use]
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}
