//! Local include discovery.
//!
//! Only quoted `#include "..."` directives count. Angle-bracket includes and
//! quoted includes that don't resolve against a search path are treated as
//! system headers and ignored.

use anyhow::{Context, Result};
use colored::*;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static QUOTED_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*#\s*include\s*"([^"]+)""#).expect("include pattern is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeScanner {
    warn_unresolved: bool,
}

/// Result of one scan: headers found, and quoted names no search path had.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeScan {
    pub found: BTreeSet<PathBuf>,
    /// In discovery order, each name once
    pub unresolved: Vec<String>,
}

impl IncludeScanner {
    /// `warn_unresolved` prints a warning for every quoted include that no
    /// search path resolves. Off by default.
    pub fn new(warn_unresolved: bool) -> Self {
        Self { warn_unresolved }
    }

    /// Transitive set of local headers reachable from `file`.
    pub fn scan(&self, file: &Path, search_paths: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
        Ok(self.scan_report(file, search_paths)?.found)
    }

    /// Like [`scan`](Self::scan), also reporting unresolved names.
    ///
    /// Each included name is tried against every search path; every hit is
    /// recorded and scanned in turn. A file already in the set is never
    /// scanned twice, so mutually-including headers terminate.
    pub fn scan_report(&self, file: &Path, search_paths: &[PathBuf]) -> Result<IncludeScan> {
        let mut scan = IncludeScan::default();
        self.scan_into(file, search_paths, &mut scan)?;
        Ok(scan)
    }

    fn scan_into(&self, file: &Path, search_paths: &[PathBuf], scan: &mut IncludeScan) -> Result<()> {
        let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        let content = String::from_utf8_lossy(&bytes);

        for cap in QUOTED_INCLUDE.captures_iter(&content) {
            let name = &cap[1];
            let mut resolved = false;

            for dir in search_paths {
                let candidate = dir.join(name);
                if !candidate.is_file() {
                    continue;
                }
                resolved = true;
                if scan.found.insert(candidate.clone()) {
                    self.scan_into(&candidate, search_paths, scan)?;
                }
            }

            if resolved {
                continue;
            }
            if self.warn_unresolved {
                println!(
                    "   {} Unresolved include \"{}\" in {}",
                    "⚠".yellow(),
                    name,
                    file.display()
                );
            }
            if !scan.unresolved.iter().any(|n| n == name) {
                scan.unresolved.push(name.to_string());
            }
        }

        Ok(())
    }
}
