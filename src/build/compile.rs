use super::context::BuildContext;
use super::dispatcher::Job;
use super::staleness::needs_rebuild;
use super::target::{BuiltTarget, Sources};
use crate::toolchain;
use anyhow::Result;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

struct CompileStep {
    source: PathBuf,
    object: PathBuf,
    job: Job,
    stale: bool,
}

/// Compile every stale source of one target and wait for the whole wave.
///
/// Include scanning and timestamp checks run in parallel; jobs are submitted
/// in source order. Returns the object path of every source, stale or not.
pub fn compile_wave(
    ctx: &mut BuildContext,
    sources: &Sources,
    deps: &[BuiltTarget],
) -> Result<Vec<PathBuf>> {
    let mut search_paths = sources.includes.clone();
    search_paths.extend(sources.dirs.iter().cloned());
    for dep in deps {
        search_paths.extend(dep.compile.include_dirs.iter().cloned());
    }
    let include_flags: Vec<String> = search_paths
        .iter()
        .map(|p| format!("-I{}", p.display()))
        .collect();

    let steps = {
        let tc = ctx.toolchain();
        let layout = ctx.layout();
        let scanner = ctx.scanner();
        let opt_flag = layout.profile().opt_flag();

        sources
            .files
            .par_iter()
            .map(|source| -> Result<CompileStep> {
                let language = toolchain::language_of(source)?;
                let object = layout.object_path(source);
                let includes = scanner.scan(source, &search_paths)?;
                let stale = needs_rebuild(source, &object, &includes)?;

                let job = Job::new(tc.compiler_for(language))
                    .args(tc.flags_for(language))
                    .arg(opt_flag)
                    .arg(tc.std_flag(language))
                    .args(include_flags.iter().cloned())
                    .args(["-c", "-o"])
                    .path_arg(&object)
                    .path_arg(source);

                Ok(CompileStep {
                    source: source.clone(),
                    object,
                    job,
                    stale,
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    for step in &steps {
        ctx.record_compile(&step.job, &step.source);
        if step.stale {
            if let Some(parent) = step.object.parent() {
                fs::create_dir_all(parent)?;
            }
            ctx.dispatcher().submit(step.job.clone())?;
        }
    }
    ctx.dispatcher().wait_all()?;

    Ok(steps.into_iter().map(|s| s.object).collect())
}
