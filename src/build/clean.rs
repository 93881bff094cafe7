//! The `clean` action.
//!
//! Every registered target deletes its known outputs, then the shared build
//! root and `compile_commands.json` go. Absent files are not an error.

use super::context::BuildContext;
use anyhow::{Context, Result};
use colored::*;
use std::fs;

pub fn clean(ctx: &mut BuildContext) -> Result<()> {
    println!("{} Cleaning...", "🧹".yellow());

    for target in ctx.targets() {
        target
            .clean(ctx.layout())
            .with_context(|| format!("Failed to clean target '{}'", target.name()))?;
    }

    let build_root = ctx.layout().build_root();
    if build_root.exists() {
        fs::remove_dir_all(build_root)
            .with_context(|| format!("Failed to remove {}", build_root.display()))?;
    }

    let compile_db = ctx.layout().compile_db_path();
    if compile_db.exists() {
        fs::remove_file(&compile_db).context("Failed to remove compile commands")?;
    }

    ctx.forget_built();
    println!("{} Clean complete.", "✓".green());
    Ok(())
}
