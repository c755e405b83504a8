//! chores Android CLI
//!
//! Resolves the Android build configuration of the chores app and prints it,
//! checks it, or renders it back to a Gradle script.

use anyhow::Result;
use chores_android::gradle;
use chores_android::{resolve, BuildConfig, DeclaredConfig, Defaults};
use chores_cli::logging::{self, LogSettings};
use chores_cli::output::{format_count, format_list, Status};
use chores_core::config::{Config, OutputFormat};
use chores_core::error::{exit_codes, Error};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chores-android")]
#[command(about = "Resolve the chores Android build configuration")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the build descriptor
    Resolve {
        #[command(flatten)]
        source: SourceArgs,
        /// Output format: human, json, gradle
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Resolve and report only whether it succeeds
    Check {
        #[command(flatten)]
        source: SourceArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render build.gradle.kts from the resolved descriptor
    Render {
        #[command(flatten)]
        source: SourceArgs,
        /// Render the flutter.* local.properties entries instead
        #[arg(long)]
        properties: bool,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where declarations and defaults come from
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Declared fragment (TOML). Uses the built-in chores fragment when omitted
    #[arg(long)]
    declared: Option<PathBuf>,

    /// Umbrella Flutter project root
    #[arg(long)]
    umbrella: Option<PathBuf>,

    /// Override compileSdk
    #[arg(long)]
    compile_sdk: Option<u32>,

    /// Override minSdk
    #[arg(long)]
    min_sdk: Option<u32>,

    /// Override targetSdk
    #[arg(long)]
    target_sdk: Option<u32>,

    /// Override versionCode
    #[arg(long)]
    version_code: Option<u32>,

    /// Override versionName
    #[arg(long)]
    version_name: Option<String>,
}

impl SourceArgs {
    fn overrides(&self) -> Defaults {
        Defaults {
            compile_sdk: self.compile_sdk,
            min_sdk: self.min_sdk,
            target_sdk: self.target_sdk,
            version_code: self.version_code,
            version_name: self.version_name.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };

    if cli.no_color || !config.schema.output.color {
        owo_colors::set_override(false);
    }

    let settings = LogSettings {
        level: config.schema.log.level.clone(),
        verbosity: cli.verbose,
        quiet: cli.quiet,
        json: cli.log_json,
    };
    logging::init(&settings).map_err(anyhow::Error::msg)?;

    let exit_code = match cli.command {
        Commands::Resolve { source, format } => {
            let format = format.unwrap_or(config.schema.output.format);
            run_resolve(&source, &config, format, cli.quiet)
        }
        Commands::Check { source, json } => run_check(&source, &config, json, cli.quiet),
        Commands::Render {
            source,
            properties,
            output,
        } => run_render(&source, &config, properties, output.as_deref()),
    };

    std::process::exit(exit_code);
}

/// Load declarations and defaults, then resolve
fn load_and_resolve(source: &SourceArgs, config: &Config) -> chores_core::Result<BuildConfig> {
    let declared_path = source
        .declared
        .as_deref()
        .or(config.schema.general.declared.as_deref());
    let declared = DeclaredConfig::load_or_builtin(declared_path)?;

    let umbrella_root = umbrella_root(source, config, &declared);
    tracing::info!(umbrella = %umbrella_root.display(), "Loading umbrella defaults");

    let defaults = Defaults::load(
        &umbrella_root,
        &config.schema.umbrella.properties_file,
        &config.schema.umbrella.pubspec_file,
    )?
    .overlay(source.overrides());

    Ok(resolve(&declared, &defaults)?)
}

/// `--umbrella`, then the tool config, then `flutter.source` relative to the module
fn umbrella_root(source: &SourceArgs, config: &Config, declared: &DeclaredConfig) -> PathBuf {
    source
        .umbrella
        .clone()
        .or_else(|| config.schema.umbrella.root.clone())
        .unwrap_or_else(|| config.schema.general.module_dir.join(&declared.flutter.source))
}

fn report_error(err: &Error, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(&err.to_report()) {
            Ok(out) => println!("{out}"),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
    err.exit_code()
}

fn run_resolve(source: &SourceArgs, config: &Config, format: OutputFormat, quiet: bool) -> i32 {
    let resolved = match load_and_resolve(source, config) {
        Ok(resolved) => resolved,
        Err(e) => return report_error(&e, format == OutputFormat::Json),
    };

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&resolved) {
            Ok(out) => println!("{out}"),
            Err(e) => return report_error(&Error::from(e), true),
        },
        OutputFormat::Gradle => print!("{}", gradle::render_build_script(&resolved)),
        OutputFormat::Human => print_human(&resolved, quiet),
    }

    exit_codes::SUCCESS
}

fn print_human(resolved: &BuildConfig, quiet: bool) {
    Status::header("Build configuration");
    Status::field("applicationId", resolved.application_id());
    Status::field("namespace", resolved.namespace());
    Status::field(
        "sdk",
        format!(
            "min {} / target {} / compile {}",
            resolved.min_sdk(),
            resolved.target_sdk(),
            resolved.compile_sdk()
        ),
    );
    Status::field("ndkVersion", resolved.ndk_version());
    Status::field(
        "version",
        format!("{} ({})", resolved.version_name(), resolved.version_code()),
    );
    Status::field("java", resolved.java_compatibility());
    Status::field("desugaring", resolved.desugaring_enabled());
    Status::field("release signing", resolved.signing_ref());
    Status::field("plugins", format_list(resolved.plugins()));
    Status::field(
        "dependencies",
        format_count(resolved.dependencies().len(), "dependency", "dependencies"),
    );
    for dep in resolved.dependencies() {
        Status::field("", dep);
    }

    if resolved.release_uses_debug_signing() && !quiet {
        println!();
        Status::warning("Release builds are signed with the debug keystore");
    }
}

fn run_check(source: &SourceArgs, config: &Config, json: bool, quiet: bool) -> i32 {
    match load_and_resolve(source, config) {
        Ok(resolved) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": true,
                        "applicationId": resolved.application_id(),
                        "releaseUsesDebugSigning": resolved.release_uses_debug_signing(),
                    })
                );
            } else if !quiet {
                Status::success(&format!(
                    "{} resolves ({} {})",
                    resolved.application_id(),
                    resolved.version_name(),
                    resolved.version_code()
                ));
            }
            exit_codes::SUCCESS
        }
        Err(e) => report_error(&e, json),
    }
}

fn run_render(
    source: &SourceArgs,
    config: &Config,
    properties: bool,
    output: Option<&Path>,
) -> i32 {
    let resolved = match load_and_resolve(source, config) {
        Ok(resolved) => resolved,
        Err(e) => return report_error(&e, false),
    };

    let rendered = if properties {
        gradle::render_local_properties(&resolved)
    } else {
        gradle::render_build_script(&resolved)
    };

    match output {
        Some(path) => match std::fs::write(path, rendered) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Wrote rendered output");
                exit_codes::SUCCESS
            }
            Err(e) => report_error(
                &Error::from(e).with_context(format!("Writing {}", path.display())),
                false,
            ),
        },
        None => {
            print!("{rendered}");
            exit_codes::SUCCESS
        }
    }
}
