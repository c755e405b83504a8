//! Structured logging setup
//!
//! Wires `tracing` to stderr with an `EnvFilter`. `RUST_LOG` wins over the
//! configured level; `-v` flags raise it.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Base level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Number of `-v` flags given
    pub verbosity: u8,
    /// `-q` given: errors only
    pub quiet: bool,
    /// Emit JSON lines instead of the compact formatter
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            verbosity: 0,
            quiet: false,
            json: false,
        }
    }
}

impl LogSettings {
    /// Level after applying `-q` and `-v`
    #[must_use]
    pub fn effective_level(&self) -> &str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => &self.level,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Install the global subscriber
pub fn init(settings: &LogSettings) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.effective_level()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };
    result.map_err(|e| format!("Failed to set tracing subscriber: {e}"))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        level = settings.effective_level(),
        "Logging initialized"
    );
    Ok(())
}
