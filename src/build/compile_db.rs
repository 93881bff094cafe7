use super::dispatcher::Job;
use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::Path;

/// Accumulates `compile_commands.json` entries for IDE integration.
#[derive(Debug, Default)]
pub struct CompileDatabase {
    entries: Vec<serde_json::Value>,
}

impl CompileDatabase {
    pub fn record(&mut self, directory: &Path, job: &Job, source: &Path) {
        let file = source.to_string_lossy();
        // A source shared by two targets keeps its latest command only
        self.entries
            .retain(|e| e.get("file").and_then(|f| f.as_str()) != Some(file.as_ref()));
        self.entries.push(json!({
            "directory": directory.to_string_lossy(),
            "command": job.to_string(),
            "file": file,
        }));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json_str = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json_str).with_context(|| format!("Failed to write {}", path.display()))
    }
}
