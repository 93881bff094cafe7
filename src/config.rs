//! Project description (`smake.toml`).
//!
//! The file declares targets and toolchain settings; [`ProjectConfig::into_context`]
//! registers them on a fresh [`BuildContext`]. Paths are relative to the
//! directory holding the file.

use crate::build::{BuildContext, IncludeScanner, Layout, Profile};
use crate::toolchain::{Language, LanguageMask, Toolchain};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROJECT_FILE: &str = "smake.toml";
pub const DEFAULT_TARGET: &str = "main";

#[derive(Deserialize, Debug, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub toolchain: Toolchain,
    #[serde(default, rename = "flag")]
    pub flags: Vec<FlagConfig>,
    #[serde(default)]
    pub executable: BTreeMap<String, ExecutableConfig>,
    #[serde(default)]
    pub library: BTreeMap<String, LibraryConfig>,
    #[serde(default)]
    pub cuda_library: BTreeMap<String, LibraryConfig>,
    #[serde(default)]
    pub dynamic: DynamicConfig,
    #[serde(default)]
    pub alias: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ProjectSection {
    pub build_dir: PathBuf,
    pub debug: bool,
    pub jobs: Option<usize>,
    pub default: Option<String>,
    pub run: Option<String>,
    pub warn_unresolved_includes: bool,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            debug: false,
            jobs: None,
            default: None,
            run: None,
            warn_unresolved_includes: false,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct FlagConfig {
    pub value: String,
    /// Omitted means every language, including the link step
    pub languages: Option<Vec<Language>>,
}

#[derive(Deserialize, Debug)]
pub struct ExecutableConfig {
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub includes: Vec<PathBuf>,
}

#[derive(Deserialize, Debug)]
pub struct LibraryConfig {
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub includes: Vec<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DynamicConfig {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Command-line settings that take precedence over the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub debug: Option<bool>,
    pub jobs: Option<usize>,
}

// --- Helper: Load Config ---
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} not found.\n\n\
            💡 Tip: Create it with at least one [executable.<name>] table, or pass -f <file>.",
            path.display()
        ));
    }
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    parse_config(&config_str)
        .with_context(|| format!("Failed to parse {} - check for syntax errors", path.display()))
}

pub fn parse_config(config_str: &str) -> Result<ProjectConfig> {
    Ok(toml::from_str(config_str)?)
}

impl ProjectConfig {
    /// Target built when the command line names none.
    pub fn default_target(&self) -> &str {
        self.project.default.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    /// Register everything in this description on a new context rooted at
    /// `project_dir`.
    ///
    /// Order: external libraries, libraries, CUDA libraries, executables,
    /// aliases, then the run binding.
    pub fn into_context(self, project_dir: &Path, overrides: Overrides) -> Result<BuildContext> {
        let debug = overrides.debug.unwrap_or(self.project.debug);
        let layout = Layout::new(project_dir, &self.project.build_dir, Profile::from_debug(debug));
        let jobs = overrides.jobs.or(self.project.jobs);

        let mut ctx = BuildContext::new(layout, self.toolchain, jobs)
            .with_scanner(IncludeScanner::new(self.project.warn_unresolved_includes));

        for flag in self.flags {
            let mask = flag
                .languages
                .as_deref()
                .map_or_else(LanguageMask::all, LanguageMask::of);
            ctx.add_flag(flag.value, mask);
        }

        for name in &self.dynamic.names {
            ctx.add_dynamic(name)?;
        }
        for (name, lib) in &self.library {
            ctx.add_library(name, &lib.sources, &lib.includes)
                .with_context(|| format!("Invalid library '{}'", name))?;
        }
        for (name, lib) in &self.cuda_library {
            ctx.add_cuda_library(name, &lib.sources, &lib.includes)
                .with_context(|| format!("Invalid CUDA library '{}'", name))?;
        }
        for (name, exe) in &self.executable {
            ctx.add_executable(name, &exe.sources, &exe.deps, &exe.includes)
                .with_context(|| format!("Invalid executable '{}'", name))?;
        }
        for (name, target) in &self.alias {
            ctx.add_alias(name, target)?;
        }
        if let Some(run) = &self.project.run {
            ctx.set_run_target(run);
        }

        Ok(ctx)
    }
}
