//! Where build outputs live.
//!
//! ```text
//! <project>/<build_root>/<debug|release>/<source path>.o   (main.c -> main.c.o)
//! <project>/<build_root>/<debug|release>/lib<name>.a
//! <project>/<name>                         (executables)
//! <project>/compile_commands.json
//! ```

use std::path::{Component, Path, PathBuf};

/// Stands in for `..` when a source above the project root is mirrored
/// into the build tree.
pub const PARENT_DIR_MARKER: &str = "__parent__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    Debug,
    #[default]
    Release,
}

impl Profile {
    pub fn from_debug(debug: bool) -> Self {
        if debug { Profile::Debug } else { Profile::Release }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }

    /// `-g` for debug builds, `-O3` for release builds.
    pub fn opt_flag(&self) -> &'static str {
        match self {
            Profile::Debug => "-g",
            Profile::Release => "-O3",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    project_dir: PathBuf,
    build_root: PathBuf,
    profile: Profile,
}

impl Layout {
    /// `build_root` is taken relative to `project_dir` unless absolute.
    pub fn new(project_dir: impl Into<PathBuf>, build_root: impl AsRef<Path>, profile: Profile) -> Self {
        let project_dir = project_dir.into();
        let build_root = project_dir.join(build_root);
        Self {
            project_dir,
            build_root,
            profile,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.build_root.join(self.profile.dir_name())
    }

    /// Object file for `source`, mirroring the source's path below the
    /// project root.
    ///
    /// The source extension is kept (`a.c` -> `a.c.o`) so `a.c` and `a.cpp`
    /// in one directory get distinct objects. Each `..` becomes a
    /// [`PARENT_DIR_MARKER`] directory.
    pub fn object_path(&self, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.project_dir).unwrap_or(source);
        let mut mirrored = self.profile_dir();
        for component in relative.components() {
            match component {
                Component::Normal(part) => mirrored.push(part),
                Component::ParentDir => mirrored.push(PARENT_DIR_MARKER),
                _ => {}
            }
        }
        let mut name = mirrored.into_os_string();
        name.push(".o");
        PathBuf::from(name)
    }

    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.profile_dir().join(format!("lib{}.a", name))
    }

    pub fn executable_path(&self, name: &str) -> PathBuf {
        self.project_dir.join(name)
    }

    pub fn compile_db_path(&self) -> PathBuf {
        self.project_dir.join("compile_commands.json")
    }
}
