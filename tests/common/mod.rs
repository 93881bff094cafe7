//! Shared fixtures: scratch projects and a fake toolchain.
//!
//! The fake toolchain is one shell script standing in for the compiler,
//! archiver and linker. It appends its arguments to `invocations.log`, fails
//! when any argument mentions `broken`, and otherwise touches the file after
//! `-o` (or the archive after `rcs`).

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub struct Project {
    pub dir: TempDir,
    pub tool: PathBuf,
    pub log: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create scratch project");
        let log = dir.path().join("invocations.log");
        let tool = dir.path().join("fakecc");
        let script = format!(
            r#"#!/bin/sh
echo "$@" >> '{log}'
case "$*" in *broken*) exit 1 ;; esac
if [ "$1" = "rcs" ]; then
    touch "$2"
    exit 0
fi
out=""
while [ $# -gt 0 ]; do
    if [ "$1" = "-o" ]; then out="$2"; fi
    shift
done
if [ -n "$out" ]; then touch "$out"; fi
"#,
            log = log.display()
        );
        fs::write(&tool, script).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, tool, log }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a file and date it well in the past, so outputs created during
    /// the test are strictly newer whatever the filesystem's mtime precision.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        set_age(&path, 1_000);
        path
    }

    /// `smake.toml` using the fake tool for every toolchain role.
    pub fn write_config(&self, body: &str) -> PathBuf {
        let tool = self.tool.display();
        let config = format!(
            r#"[toolchain]
cc = "{tool}"
cxx = "{tool}"
nvcc = "{tool}"
linker = "{tool}"
archiver = "{tool}"
debugger = "{tool}"

{body}"#
        );
        let path = self.path("smake.toml");
        fs::write(&path, config).unwrap();
        path
    }

    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn clear_log(&self) {
        let _ = fs::remove_file(&self.log);
    }

    pub fn compiles(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|l| l.split_whitespace().any(|a| a == "-c"))
            .collect()
    }

    pub fn archives(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|l| l.starts_with("rcs "))
            .collect()
    }

    pub fn links(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|l| !l.starts_with("rcs ") && !l.split_whitespace().any(|a| a == "-c"))
            .collect()
    }

    /// Push every file under the build root, plus `extra`, `secs` into the
    /// past.
    pub fn age_outputs(&self, secs: u64, extra: &[&str]) {
        let time = SystemTime::now() - Duration::from_secs(secs);
        for entry in walkdir::WalkDir::new(self.path("build"))
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            set_mtime(entry.path(), time);
        }
        for rel in extra {
            set_mtime(&self.path(rel), time);
        }
    }
}

pub fn set_age(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() - Duration::from_secs(secs));
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Whether any of `lines` compiled the source whose path ends in `suffix`.
pub fn compiled(lines: &[String], suffix: &str) -> bool {
    lines.iter().any(|l| l.ends_with(suffix))
}
