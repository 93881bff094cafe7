use super::clean::clean;
use super::context::BuildContext;
use super::target::BuiltTarget;
use crate::error::BuildError;
use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::Instant;

/// Reserved action names, looked up only when no target has the name.
pub const ACTION_RUN: &str = "run";
pub const ACTION_DEBUG: &str = "debug";
pub const ACTION_CLEAN: &str = "clean";

#[derive(Debug)]
pub enum Outcome {
    Built(BuiltTarget),
    /// Exit status of the program started by `run` or `debug`
    Ran(ExitStatus),
    Cleaned,
}

// --- CORE: Execute a target or action ---
/// Resolve `name` against the target registry first, then the reserved
/// actions. `run_args` are passed to the program started by `run`.
pub fn execute(ctx: &mut BuildContext, name: &str, run_args: &[String]) -> Result<Outcome> {
    if ctx.has_target(name) {
        return build_target(ctx, name).map(Outcome::Built);
    }

    match name {
        ACTION_CLEAN => {
            clean(ctx)?;
            Ok(Outcome::Cleaned)
        }
        ACTION_RUN | ACTION_DEBUG => {
            let target = ctx
                .run_target()
                .map(str::to_string)
                .ok_or_else(|| BuildError::NoRunTarget(name.to_string()))?;
            let built = build_target(ctx, &target)?;
            let exe = built
                .executable()
                .map(Path::to_path_buf)
                .ok_or_else(|| BuildError::NotExecutable(target.clone()))?;

            let status = if name == ACTION_DEBUG {
                let debugger = ctx.toolchain().debugger.clone();
                launch(ctx, &debugger, &[exe.to_string_lossy().to_string()])?
            } else {
                launch(ctx, &exe, run_args)?
            };
            Ok(Outcome::Ran(status))
        }
        _ => Err(BuildError::UnknownTarget(name.to_string()).into()),
    }
}

/// Build one target and refresh `compile_commands.json`.
pub fn build_target(ctx: &mut BuildContext, name: &str) -> Result<BuiltTarget> {
    let start_time = Instant::now();
    let built = ctx.resolve(name)?;

    if !ctx.compile_db().is_empty() {
        ctx.compile_db().write(&ctx.layout().compile_db_path())?;
    }

    println!(
        "{} Finished {} in {:.2?}",
        "✓".green(),
        name.bold(),
        start_time.elapsed()
    );
    Ok(built)
}

fn launch(ctx: &BuildContext, program: &Path, args: &[String]) -> Result<ExitStatus> {
    println!("{} Running {}\n", "▶".green(), program.display());
    Command::new(program)
        .args(args)
        .current_dir(ctx.layout().project_dir())
        .status()
        .with_context(|| format!("Failed to start '{}'", program.display()))
}
