mod clean;
mod compile;
mod compile_db;
mod context;
mod core;
pub mod dispatcher;
pub mod include_scan;
mod layout;
pub mod staleness;
mod target;

pub use clean::clean;
pub use compile_db::CompileDatabase;
pub use context::BuildContext;
pub use self::core::{ACTION_CLEAN, ACTION_DEBUG, ACTION_RUN, Outcome, build_target, execute};
pub use dispatcher::{Dispatcher, Job};
pub use include_scan::{IncludeScan, IncludeScanner};
pub use layout::{Layout, Profile};
pub use target::{Artifact, BuiltTarget, CompileParams, LinkParams, Target};
