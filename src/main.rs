//! # smake CLI Entry Point
//!
//! `smake [target] [-f file] [-d|--debug] [-r|--release] [-j N] [-- args...]`
//!
//! `target` is a registered target name or one of the reserved actions
//! `run`, `debug` and `clean`.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use smake::build::{self, Outcome};
use smake::config::{self, DEFAULT_PROJECT_FILE, Overrides};

#[derive(Parser)]
#[command(name = "smake")]
#[command(about = "simple c/c++ build system", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Target to build, or run/debug/clean
    target: Option<String>,

    /// Project description file
    #[arg(short, long, default_value = DEFAULT_PROJECT_FILE)]
    file: PathBuf,

    /// Debug build (-g, build/debug); wins over --release
    #[arg(short, long)]
    debug: bool,

    /// Release build (-O3, build/release)
    #[arg(short, long)]
    release: bool,

    /// Maximum number of compiler processes at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Arguments passed to the program started by `run`
    #[arg(last = true)]
    args: Vec<String>,
}

fn project_dir(file: &Path) -> Result<PathBuf> {
    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent
        .canonicalize()
        .with_context(|| format!("Failed to resolve project directory of {}", file.display()))
}

fn run(cli: Cli) -> Result<ExitCode> {
    let project = config::load_config(&cli.file)?;
    let root = project_dir(&cli.file)?;

    let debug = if cli.debug {
        Some(true)
    } else if cli.release {
        Some(false)
    } else {
        None
    };

    let target = cli
        .target
        .clone()
        .unwrap_or_else(|| project.default_target().to_string());
    let mut ctx = project.into_context(
        &root,
        Overrides {
            debug,
            jobs: cli.jobs,
        },
    )?;

    match build::execute(&mut ctx, &target, &cli.args)? {
        Outcome::Ran(status) if !status.success() => {
            let code = status.code().unwrap_or(1).clamp(1, 255) as u8;
            Ok(ExitCode::from(code))
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}
