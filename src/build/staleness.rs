use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read modification time of {}", path.display()))
}

/// A derived file is stale when it is missing or strictly older than any
/// input. Equal timestamps count as up to date.
pub fn is_stale<I, P>(output: &Path, inputs: I) -> Result<bool>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    if !output.exists() {
        return Ok(true);
    }

    let output_time = modified(output)?;
    for input in inputs {
        if output_time < modified(input.as_ref())? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Whether `object` must be recompiled from `source` given the headers the
/// source transitively includes.
pub fn needs_rebuild(source: &Path, object: &Path, includes: &BTreeSet<PathBuf>) -> Result<bool> {
    is_stale(
        object,
        std::iter::once(source).chain(includes.iter().map(PathBuf::as_path)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn file_at(dir: &Path, name: &str, time: SystemTime) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(time)
            .unwrap();
        path
    }

    fn base() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_missing_object_is_stale() {
        let tmp = TempDir::new().unwrap();
        let src = file_at(tmp.path(), "main.c", base());
        let obj = tmp.path().join("main.o");
        assert!(needs_rebuild(&src, &obj, &BTreeSet::new()).unwrap());
    }

    #[test]
    fn test_older_object_is_stale() {
        let tmp = TempDir::new().unwrap();
        let obj = file_at(tmp.path(), "main.o", base());
        let src = file_at(tmp.path(), "main.c", base() + Duration::from_secs(1));
        assert!(needs_rebuild(&src, &obj, &BTreeSet::new()).unwrap());
    }

    #[test]
    fn test_newer_object_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let src = file_at(tmp.path(), "main.c", base());
        let obj = file_at(tmp.path(), "main.o", base() + Duration::from_secs(1));
        assert!(!needs_rebuild(&src, &obj, &BTreeSet::new()).unwrap());
    }

    #[test]
    fn test_equal_timestamps_are_fresh() {
        let tmp = TempDir::new().unwrap();
        let src = file_at(tmp.path(), "main.c", base());
        let obj = file_at(tmp.path(), "main.o", base());
        assert!(!needs_rebuild(&src, &obj, &BTreeSet::new()).unwrap());
    }

    #[test]
    fn test_newer_header_makes_object_stale() {
        let tmp = TempDir::new().unwrap();
        let src = file_at(tmp.path(), "main.c", base());
        let obj = file_at(tmp.path(), "main.o", base() + Duration::from_secs(5));
        let hdr = file_at(tmp.path(), "add.h", base() + Duration::from_secs(10));
        let untouched = file_at(tmp.path(), "sub.h", base());

        let includes = BTreeSet::from([untouched.clone()]);
        assert!(!needs_rebuild(&src, &obj, &includes).unwrap());

        let includes = BTreeSet::from([untouched, hdr]);
        assert!(needs_rebuild(&src, &obj, &includes).unwrap());
    }

    #[test]
    fn test_archive_staleness_against_objects() {
        let tmp = TempDir::new().unwrap();
        let a = file_at(tmp.path(), "a.o", base());
        let b = file_at(tmp.path(), "b.o", base() + Duration::from_secs(2));
        let lib = file_at(tmp.path(), "libx.a", base() + Duration::from_secs(1));

        assert!(is_stale(&lib, [&a, &b]).unwrap());
        assert!(!is_stale(&lib, [&a]).unwrap());
        assert!(is_stale(&tmp.path().join("libmissing.a"), [&a]).unwrap());
    }
}
