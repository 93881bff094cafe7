//! Toolchain resolution
//!
//! Maps a source file to its language by extension, and a language to the
//! compiler and flags used for it. Only files that target discovery already
//! accepted reach here; anything else is an unsupported source.

pub mod types;

pub use types::{Language, LanguageMask, Toolchain};

use crate::error::BuildError;
use std::path::Path;

/// Extensions compiled as C++
pub const CXX_EXTENSIONS: [&str; 4] = ["cpp", "cc", "cxx", "c++"];

/// Extensions accepted by plain executables and libraries
pub fn is_c_family_source(path: &Path) -> bool {
    matches!(classify(path), Some(Language::C | Language::Cxx))
}

/// Extensions accepted by CUDA libraries
pub fn is_cuda_family_source(path: &Path) -> bool {
    classify(path).is_some()
}

/// Language of `path` by extension, `None` if it is not a source file.
pub fn classify(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;
    match ext {
        "c" => Some(Language::C),
        "cu" => Some(Language::Cuda),
        _ if CXX_EXTENSIONS.contains(&ext) => Some(Language::Cxx),
        _ => None,
    }
}

/// Like [`classify`], but an unknown extension is an error.
pub fn language_of(path: &Path) -> Result<Language, BuildError> {
    classify(path).ok_or_else(|| BuildError::UnsupportedSource(path.to_path_buf()))
}
