use std::path::PathBuf;

/// Failures raised by target registration, resolution and dispatch.
///
/// Everything here is fatal for the invocation: callers propagate it with `?`
/// and `main` turns it into a non-zero exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Name is neither a registered target nor a reserved action
    UnknownTarget(String),
    /// A target or alias with this name was already registered
    DuplicateTarget(String),
    /// Resolution chain that loops back on itself, first name repeated last
    CyclicDependency(Vec<String>),
    /// An external compile/archive/link process exited non-zero
    CommandFailed { command: String, code: Option<i32> },
    /// A file reached the toolchain resolver with an extension it can't compile
    UnsupportedSource(PathBuf),
    /// A registered source directory does not exist
    MissingSourceDir { target: String, dir: PathBuf },
    /// `run`/`debug` resolved to something that has no executable output
    NotExecutable(String),
    /// `run`/`debug` requested but no run target was registered
    NoRunTarget(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::UnknownTarget(name) => write!(f, "Unknown target or action '{}'", name),
            BuildError::DuplicateTarget(name) => {
                write!(f, "Target '{}' is registered more than once", name)
            }
            BuildError::CyclicDependency(chain) => {
                write!(f, "Cyclic dependency: {}", chain.join(" -> "))
            }
            BuildError::CommandFailed { command, code } => match code {
                Some(code) => write!(f, "Command exited with status {}: {}", code, command),
                None => write!(f, "Command terminated by signal: {}", command),
            },
            BuildError::UnsupportedSource(path) => {
                write!(f, "Unsupported source kind: {}", path.display())
            }
            BuildError::MissingSourceDir { target, dir } => write!(
                f,
                "Source directory '{}' of target '{}' does not exist",
                dir.display(),
                target
            ),
            BuildError::NotExecutable(name) => {
                write!(f, "Target '{}' does not produce an executable", name)
            }
            BuildError::NoRunTarget(action) => write!(
                f,
                "Action '{}' needs a run target (set `run = \"<target>\"` in [project])",
                action
            ),
        }
    }
}

impl std::error::Error for BuildError {}
