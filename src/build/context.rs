//! Per-invocation build state.
//!
//! A [`BuildContext`] owns everything one build needs: the toolchain, output
//! layout, dispatcher, target registry and the memo of targets already built.
//! Nothing is process-global, so independent builds can share a process.

use super::compile_db::CompileDatabase;
use super::dispatcher::{Dispatcher, Job, default_jobs};
use super::include_scan::IncludeScanner;
use super::layout::Layout;
use super::target::{Alias, BuiltTarget, CudaLibrary, Dynamic, Executable, Library, Sources, Target};
use crate::error::BuildError;
use crate::toolchain::{LanguageMask, Toolchain, is_c_family_source, is_cuda_family_source};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct BuildContext {
    layout: Layout,
    toolchain: Toolchain,
    scanner: IncludeScanner,
    dispatcher: Dispatcher,
    targets: BTreeMap<String, Rc<dyn Target>>,
    run_target: Option<String>,
    built: HashMap<String, BuiltTarget>,
    resolving: Vec<String>,
    compile_db: CompileDatabase,
}

impl BuildContext {
    /// `jobs` defaults to the host's processing unit count.
    pub fn new(layout: Layout, toolchain: Toolchain, jobs: Option<usize>) -> Self {
        let dispatcher =
            Dispatcher::new(jobs.unwrap_or_else(default_jobs)).with_workdir(layout.project_dir());
        Self {
            layout,
            toolchain,
            scanner: IncludeScanner::default(),
            dispatcher,
            targets: BTreeMap::new(),
            run_target: None,
            built: HashMap::new(),
            resolving: Vec::new(),
            compile_db: CompileDatabase::default(),
        }
    }

    pub fn with_scanner(mut self, scanner: IncludeScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn scanner(&self) -> &IncludeScanner {
        &self.scanner
    }

    pub fn dispatcher(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Processes launched so far in this context.
    pub fn launched(&self) -> usize {
        self.dispatcher.launched()
    }

    pub fn compile_db(&self) -> &CompileDatabase {
        &self.compile_db
    }

    pub(crate) fn record_compile(&mut self, job: &Job, source: &Path) {
        self.compile_db
            .record(self.layout.project_dir(), job, source);
    }

    // --- Registration ---

    pub fn add_flag(&mut self, flag: impl Into<String>, mask: LanguageMask) {
        self.toolchain.add_flag(flag, mask);
    }

    pub fn add_executable(
        &mut self,
        name: &str,
        source_dirs: &[PathBuf],
        deps: &[String],
        includes: &[PathBuf],
    ) -> Result<()> {
        let sources = Sources::discover(
            name,
            self.layout.project_dir(),
            source_dirs,
            includes,
            is_c_family_source,
        )?;
        self.register(Rc::new(Executable::new(name, sources, deps.to_vec())))
    }

    pub fn add_library(&mut self, name: &str, source_dirs: &[PathBuf], includes: &[PathBuf]) -> Result<()> {
        let sources = Sources::discover(
            name,
            self.layout.project_dir(),
            source_dirs,
            includes,
            is_c_family_source,
        )?;
        self.register(Rc::new(Library::new(name, sources)))
    }

    pub fn add_cuda_library(
        &mut self,
        name: &str,
        source_dirs: &[PathBuf],
        includes: &[PathBuf],
    ) -> Result<()> {
        let sources = Sources::discover(
            name,
            self.layout.project_dir(),
            source_dirs,
            includes,
            is_cuda_family_source,
        )?;
        self.register(Rc::new(CudaLibrary::new(name, sources)))
    }

    pub fn add_dynamic(&mut self, name: &str) -> Result<()> {
        self.register(Rc::new(Dynamic::new(name)))
    }

    pub fn add_alias(&mut self, name: &str, target: &str) -> Result<()> {
        self.register(Rc::new(Alias::new(name, target)))
    }

    /// Bind the reserved `run` and `debug` actions to `target`.
    pub fn set_run_target(&mut self, target: &str) {
        self.run_target = Some(target.to_string());
    }

    pub fn run_target(&self) -> Option<&str> {
        self.run_target.as_deref()
    }

    fn register(&mut self, target: Rc<dyn Target>) -> Result<()> {
        let name = target.name().to_string();
        if self.targets.contains_key(&name) {
            return Err(BuildError::DuplicateTarget(name).into());
        }
        self.targets.insert(name, target);
        Ok(())
    }

    pub fn has_target(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Registered targets in name order.
    pub fn targets(&self) -> impl Iterator<Item = &Rc<dyn Target>> {
        self.targets.values()
    }

    // --- Resolution ---

    /// Build `name` and everything it depends on, once per context.
    ///
    /// A name that is already being resolved further up the chain is a
    /// [`BuildError::CyclicDependency`].
    pub fn resolve(&mut self, name: &str) -> Result<BuiltTarget> {
        if let Some(built) = self.built.get(name) {
            return Ok(built.clone());
        }

        if let Some(idx) = self.resolving.iter().position(|n| n == name) {
            let mut chain: Vec<String> = self.resolving[idx..].to_vec();
            chain.push(name.to_string());
            return Err(BuildError::CyclicDependency(chain).into());
        }

        let target = self
            .targets
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownTarget(name.to_string()))?;

        self.resolving.push(name.to_string());
        let result = target.build(self);
        self.resolving.pop();

        let built = result?;
        self.built.insert(name.to_string(), built.clone());
        Ok(built)
    }

    pub fn is_built(&self, name: &str) -> bool {
        self.built.contains_key(name)
    }

    /// Drop the memo of built targets, e.g. after their outputs were cleaned.
    pub fn forget_built(&mut self) {
        self.built.clear();
    }
}
