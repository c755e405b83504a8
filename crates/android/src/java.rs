//! Java language levels accepted by `compileOptions` and `kotlinOptions`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Java language level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "JavaVersionRepr", into = "String")]
pub enum JavaVersion {
    Java8,
    Java11,
    Java17,
    Java21,
}

impl JavaVersion {
    /// Feature release number (8, 11, 17, 21)
    pub fn major(self) -> u32 {
        match self {
            Self::Java8 => 8,
            Self::Java11 => 11,
            Self::Java17 => 17,
            Self::Java21 => 21,
        }
    }

    /// Gradle `JavaVersion` constant name
    pub fn gradle_constant(self) -> &'static str {
        match self {
            Self::Java8 => "VERSION_1_8",
            Self::Java11 => "VERSION_11",
            Self::Java17 => "VERSION_17",
            Self::Java21 => "VERSION_21",
        }
    }

    fn from_major(major: u32) -> Option<Self> {
        match major {
            8 => Some(Self::Java8),
            11 => Some(Self::Java11),
            17 => Some(Self::Java17),
            21 => Some(Self::Java21),
            _ => None,
        }
    }
}

/// Matches `JavaVersion.toString()`: `1.8` for Java 8, the bare number otherwise
impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Java8 => f.write_str("1.8"),
            other => write!(f, "{}", other.major()),
        }
    }
}

impl FromStr for JavaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let level = trimmed
            .strip_prefix("JavaVersion.")
            .unwrap_or(trimmed);
        let level = level.strip_prefix("VERSION_").unwrap_or(level);
        let level = level.replace('_', ".");
        // only Java 8 has a legacy `1.x` spelling
        let level = if level == "1.8" { "8" } else { level.as_str() };

        level
            .parse::<u32>()
            .ok()
            .and_then(Self::from_major)
            .ok_or_else(|| format!("unsupported Java level: {s}"))
    }
}

impl From<JavaVersion> for String {
    fn from(v: JavaVersion) -> Self {
        v.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JavaVersionRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<JavaVersionRepr> for JavaVersion {
    type Error = String;

    fn try_from(repr: JavaVersionRepr) -> Result<Self, Self::Error> {
        match repr {
            JavaVersionRepr::Number(n) => {
                Self::from_major(n).ok_or_else(|| format!("unsupported Java level: {n}"))
            }
            JavaVersionRepr::Text(s) => s.parse(),
        }
    }
}
