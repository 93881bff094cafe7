//! Bounded-concurrency runner for external build commands.
//!
//! Each launched process gets a waiter thread that blocks on the child and
//! reports its exit status over a channel. The control thread blocks on that
//! channel whenever the in-flight limit is reached, and at wave barriers.
//! A non-zero exit anywhere is returned as [`BuildError::CommandFailed`] and
//! ends the build.

use crate::error::BuildError;
use anyhow::{Context, Result};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

/// One external command: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Job {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().to_string())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

struct Completion {
    command: String,
    status: io::Result<ExitStatus>,
}

/// Default concurrency limit: the host's processing unit count, at least 1.
pub fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Not thread-safe: only the control thread submits and waits.
pub struct Dispatcher {
    limit: usize,
    workdir: Option<PathBuf>,
    in_flight: usize,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    launched: usize,
    peak: usize,
}

impl Dispatcher {
    /// `limit` of 0 is raised to 1.
    pub fn new(limit: usize) -> Self {
        let (tx, rx) = channel();
        Self {
            limit: limit.max(1),
            workdir: None,
            in_flight: 0,
            tx,
            rx,
            launched: 0,
            peak: 0,
        }
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Total processes launched over this dispatcher's lifetime.
    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Highest number of simultaneously tracked processes seen.
    pub fn peak_in_flight(&self) -> usize {
        self.peak
    }

    /// Print and launch `job` without waiting for it. Blocks first while the
    /// in-flight count is at the limit.
    pub fn submit(&mut self, job: Job) -> Result<()> {
        while self.in_flight >= self.limit {
            self.reap_one()?;
        }

        let command = job.to_string();
        println!("{}", command);

        let mut cmd = Command::new(&job.program);
        cmd.args(&job.args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to launch '{}'", job.program.display()))?;

        let tx = self.tx.clone();
        thread::spawn(move || {
            let status = child.wait();
            // Receiver only goes away when the dispatcher is dropped mid-build.
            let _ = tx.send(Completion { command, status });
        });

        self.in_flight += 1;
        self.launched += 1;
        self.peak = self.peak.max(self.in_flight);
        Ok(())
    }

    /// Block until every tracked process has exited.
    pub fn wait_all(&mut self) -> Result<()> {
        while self.in_flight > 0 {
            self.reap_one()?;
        }
        Ok(())
    }

    fn reap_one(&mut self) -> Result<()> {
        let done = self
            .rx
            .recv()
            .context("Dispatcher completion channel closed")?;
        self.in_flight -= 1;

        let status = done
            .status
            .with_context(|| format!("Failed to wait for '{}'", done.command))?;
        if !status.success() {
            return Err(BuildError::CommandFailed {
                command: done.command,
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}
