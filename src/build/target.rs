//! Target variants.
//!
//! Each kind of target implements [`Target`]: executables, static libraries,
//! CUDA static libraries, externally provided libraries and aliases. A
//! target's file list is fixed when it is registered.

use super::compile::compile_wave;
use super::context::BuildContext;
use super::dispatcher::Job;
use super::layout::Layout;
use super::staleness::is_stale;
use crate::error::BuildError;
use crate::toolchain::Language;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Include directories a target exports to its dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileParams {
    pub include_dirs: Vec<PathBuf>,
}

/// What a dependent executable adds to its link line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkParams {
    /// Static archives; also staleness inputs for the link
    pub archives: Vec<PathBuf>,
    /// `-l` style flags for external libraries
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Archive(PathBuf),
    Executable(PathBuf),
}

/// Result of building a target, memoized by name for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTarget {
    pub name: String,
    pub compile: CompileParams,
    pub link: LinkParams,
    pub artifact: Option<Artifact>,
}

impl BuiltTarget {
    pub fn executable(&self) -> Option<&Path> {
        match &self.artifact {
            Some(Artifact::Executable(path)) => Some(path),
            _ => None,
        }
    }
}

pub trait Target {
    fn name(&self) -> &str;

    /// Build dependencies, then this target. Called at most once per run;
    /// go through [`BuildContext::resolve`] rather than calling it directly.
    fn build(&self, ctx: &mut BuildContext) -> Result<BuiltTarget>;

    fn compile_params(&self, _layout: &Layout) -> CompileParams {
        CompileParams::default()
    }

    fn link_params(&self, _layout: &Layout) -> LinkParams {
        LinkParams::default()
    }

    /// Delete this target's known outputs.
    fn clean(&self, _layout: &Layout) -> Result<()> {
        Ok(())
    }
}

/// Source directories, the files discovered in them, and extra include paths.
#[derive(Debug, Clone)]
pub struct Sources {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub includes: Vec<PathBuf>,
}

impl Sources {
    /// Walk every directory in `dirs` recursively, following symlinks, and
    /// keep files accepted by `accept`. Directories are resolved against
    /// `root`. An unreadable entry fails registration.
    pub fn discover(
        target: &str,
        root: &Path,
        dirs: &[PathBuf],
        includes: &[PathBuf],
        accept: fn(&Path) -> bool,
    ) -> Result<Self> {
        let dirs: Vec<PathBuf> = dirs.iter().map(|d| root.join(d)).collect();
        let mut files = Vec::new();

        for dir in &dirs {
            if !dir.is_dir() {
                return Err(BuildError::MissingSourceDir {
                    target: target.to_string(),
                    dir: dir.clone(),
                }
                .into());
            }
            // Symlinked files and directories count as sources
            for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
                let entry = entry.with_context(|| {
                    format!("Failed to scan sources of '{}' in {}", target, dir.display())
                })?;
                if entry.file_type().is_file() && accept(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }

        Ok(Self {
            dirs,
            files,
            includes: includes.iter().map(|i| root.join(i)).collect(),
        })
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            Err(e).with_context(|| format!("Failed to remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

fn announce_start(name: &str) {
    println!("{} Building {}", "⚙".blue(), name.bold());
}

fn announce_done(name: &str) {
    println!("{} Built {}", "✓".green(), name.bold());
}

// --- Executable ---

pub struct Executable {
    name: String,
    sources: Sources,
    deps: Vec<String>,
}

impl Executable {
    pub fn new(name: impl Into<String>, sources: Sources, deps: Vec<String>) -> Self {
        Self {
            name: name.into(),
            sources,
            deps,
        }
    }
}

impl Target for Executable {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, ctx: &mut BuildContext) -> Result<BuiltTarget> {
        announce_start(&self.name);

        let mut deps = Vec::with_capacity(self.deps.len());
        for dep in &self.deps {
            deps.push(ctx.resolve(dep)?);
        }

        let objects = compile_wave(ctx, &self.sources, &deps)?;

        let output = ctx.layout().executable_path(&self.name);
        let mut libs: Vec<String> = Vec::new();
        let mut archives: Vec<&Path> = Vec::new();
        for dep in &deps {
            for archive in &dep.link.archives {
                libs.push(archive.to_string_lossy().to_string());
                archives.push(archive);
            }
            libs.extend(dep.link.flags.iter().cloned());
        }

        if is_stale(&output, archives.iter().copied().chain(objects.iter().map(PathBuf::as_path)))? {
            let tc = ctx.toolchain();
            let job = Job::new(tc.compiler_for(Language::Link))
                .args(tc.flags_for(Language::Link))
                .arg(ctx.layout().profile().opt_flag())
                .arg(tc.std_flag(Language::Link))
                .arg("-o")
                .path_arg(&output)
                .args(libs.iter().cloned())
                .args(objects.iter().map(|o| o.to_string_lossy().to_string()))
                .args(libs.iter().cloned())
                .args(libs.iter().cloned());
            ctx.dispatcher().submit(job)?;
        }
        ctx.dispatcher().wait_all()?;

        announce_done(&self.name);
        Ok(BuiltTarget {
            name: self.name.clone(),
            compile: self.compile_params(ctx.layout()),
            link: self.link_params(ctx.layout()),
            artifact: Some(Artifact::Executable(output)),
        })
    }

    fn clean(&self, layout: &Layout) -> Result<()> {
        remove_if_present(&layout.executable_path(&self.name))
    }
}

// --- Static library ---

pub struct Library {
    name: String,
    sources: Sources,
}

impl Library {
    pub fn new(name: impl Into<String>, sources: Sources) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    fn build_archive(&self, ctx: &mut BuildContext, link: LinkParams) -> Result<BuiltTarget> {
        announce_start(&self.name);

        let objects = compile_wave(ctx, &self.sources, &[])?;

        let archive = ctx.layout().archive_path(&self.name);
        if is_stale(&archive, &objects)? {
            if let Some(parent) = archive.parent() {
                fs::create_dir_all(parent)?;
            }
            // `ar rcs` only adds members; start over so deleted sources drop out
            remove_if_present(&archive)?;
            let job = Job::new(&ctx.toolchain().archiver)
                .arg("rcs")
                .path_arg(&archive)
                .args(objects.iter().map(|o| o.to_string_lossy().to_string()));
            ctx.dispatcher().submit(job)?;
            ctx.dispatcher().wait_all()?;
        }

        announce_done(&self.name);
        Ok(BuiltTarget {
            name: self.name.clone(),
            compile: self.compile_params(ctx.layout()),
            link,
            artifact: Some(Artifact::Archive(archive)),
        })
    }
}

impl Target for Library {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, ctx: &mut BuildContext) -> Result<BuiltTarget> {
        let link = self.link_params(ctx.layout());
        self.build_archive(ctx, link)
    }

    fn compile_params(&self, _layout: &Layout) -> CompileParams {
        CompileParams {
            include_dirs: self.sources.dirs.clone(),
        }
    }

    fn link_params(&self, layout: &Layout) -> LinkParams {
        LinkParams {
            archives: vec![layout.archive_path(&self.name)],
            flags: Vec::new(),
        }
    }

    fn clean(&self, layout: &Layout) -> Result<()> {
        remove_if_present(&layout.archive_path(&self.name))
    }
}

// --- CUDA static library ---

/// A static library whose sources may include `.cu` files. Dependents also
/// link the CUDA runtime.
pub struct CudaLibrary {
    inner: Library,
}

impl CudaLibrary {
    pub fn new(name: impl Into<String>, sources: Sources) -> Self {
        Self {
            inner: Library::new(name, sources),
        }
    }
}

impl Target for CudaLibrary {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn build(&self, ctx: &mut BuildContext) -> Result<BuiltTarget> {
        let link = self.link_params(ctx.layout());
        self.inner.build_archive(ctx, link)
    }

    fn compile_params(&self, layout: &Layout) -> CompileParams {
        self.inner.compile_params(layout)
    }

    fn link_params(&self, layout: &Layout) -> LinkParams {
        let mut params = self.inner.link_params(layout);
        params.flags.push("-lcudart".to_string());
        params
    }

    fn clean(&self, layout: &Layout) -> Result<()> {
        self.inner.clean(layout)
    }
}

// --- External library ---

/// A library already present on the system, linked with `-l<name>`.
pub struct Dynamic {
    name: String,
}

impl Dynamic {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Target for Dynamic {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, ctx: &mut BuildContext) -> Result<BuiltTarget> {
        Ok(BuiltTarget {
            name: self.name.clone(),
            compile: CompileParams::default(),
            link: self.link_params(ctx.layout()),
            artifact: None,
        })
    }

    fn link_params(&self, _layout: &Layout) -> LinkParams {
        LinkParams {
            archives: Vec::new(),
            flags: vec![format!("-l{}", self.name)],
        }
    }
}

// --- Alias ---

pub struct Alias {
    name: String,
    target: String,
}

impl Alias {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

impl Target for Alias {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, ctx: &mut BuildContext) -> Result<BuiltTarget> {
        ctx.resolve(&self.target)
    }
}
