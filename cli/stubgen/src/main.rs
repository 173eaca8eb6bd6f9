//! stubgen CLI — generate managed/native bridge stubs from C declarations.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use stubgen_targets::Platform;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use manifest::StubgenManifest;

#[derive(Parser)]
#[command(name = "stubgen", version, about = "Managed/native bridge stub generator")]
struct Cli {
    /// Log bridge requests and other debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new stubgen project
    Init {
        /// Project name
        name: String,
    },
    /// Generate managed and native stubs from a bridge declaration
    Generate {
        /// Path to a .bridge.toml declaration, relative to the project root
        declaration: String,
        /// Target platform (native, jvm)
        #[arg(long)]
        platform: Option<String>,
        /// Write both generated files into this directory
        #[arg(long)]
        out_dir: Option<String>,
        /// Report format (human, json)
        #[arg(long)]
        report: Option<String>,
    },
    /// List the bridged type catalog
    Types {
        /// Target platform (native, jvm)
        #[arg(long)]
        platform: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "stubgen=debug" } else { "stubgen=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Generate {
            declaration,
            platform,
            out_dir,
            report,
        } => {
            let (manifest, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::generate::run(
                &project_dir,
                manifest.as_ref(),
                &declaration,
                platform.as_deref(),
                out_dir.as_deref(),
                report.as_deref(),
            )
            .map(|_| ())
        }

        Commands::Types { platform } => {
            let platform = match platform {
                Some(name) => Platform::parse(&name)?,
                None => {
                    let (manifest, _) = load_manifest_optional(&cwd)?;
                    manifest.map(|m| m.target.platform).unwrap_or_default()
                }
            };
            commands::types::run(platform)
        }
    }
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<StubgenManifest>, Option<PathBuf>)> {
    match StubgenManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// Full workflow: init → generate from the sample declaration.
    #[test]
    fn init_then_generate_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("workflow");

        commands::init::create_project(&project_path, "workflow").unwrap();

        let nested = project_path.join("bridges");
        let (manifest, project_dir) = load_manifest_optional(&nested).unwrap();
        let project_dir = project_dir.unwrap();
        assert_eq!(project_dir, project_path);

        let written = commands::generate::run(
            &project_dir,
            manifest.as_ref(),
            "bridges/libm.bridge.toml",
            None,
            None,
            None,
        )
        .unwrap();

        let managed = std::fs::read_to_string(&written.managed).unwrap();
        // sin and cos have one shape but call different functions.
        assert!(managed.contains("fun sin(x: Double): Double = kniBridge0(x)"));
        assert!(managed.contains("fun cos(x: Double): Double = kniBridge1(x)"));
        assert_eq!(managed.matches("external fun").count(), 2);

        let native = std::fs::read_to_string(&written.native).unwrap();
        assert!(native.contains("    return (double)sin(p0);"));
        assert!(native.contains("    return (double)cos(p0);"));
    }

    #[test]
    fn cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "stubgen",
            "-v",
            "generate",
            "libm.bridge.toml",
            "--platform",
            "jvm",
            "--out-dir",
            "out",
            "--report",
            "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate {
                declaration,
                platform,
                out_dir,
                report,
            } => {
                assert_eq!(declaration, "libm.bridge.toml");
                assert_eq!(platform.as_deref(), Some("jvm"));
                assert_eq!(out_dir.as_deref(), Some("out"));
                assert_eq!(report.as_deref(), Some("json"));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["stubgen"]).is_err());
    }
}
