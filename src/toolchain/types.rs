use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Languages a flag can be scoped to.
///
/// `Link` is not a source language: it tags flags that go on the final
/// executable link line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Language {
    #[serde(rename = "c")]
    C,
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cxx,
    #[serde(rename = "cuda", alias = "cu")]
    Cuda,
    #[serde(rename = "link")]
    Link,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::C, Language::Cxx, Language::Cuda, Language::Link];

    fn bit(self) -> u8 {
        match self {
            Language::C => 1,
            Language::Cxx => 1 << 1,
            Language::Cuda => 1 << 2,
            Language::Link => 1 << 3,
        }
    }
}

/// Set of languages a registered flag applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageMask(u8);

impl LanguageMask {
    pub fn all() -> Self {
        Self::of(&Language::ALL)
    }

    pub fn of(languages: &[Language]) -> Self {
        Self(languages.iter().fold(0, |acc, l| acc | l.bit()))
    }

    pub fn contains(&self, language: Language) -> bool {
        self.0 & language.bit() != 0
    }
}

impl Default for LanguageMask {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone)]
struct RegisteredFlag {
    value: String,
    mask: LanguageMask,
}

/// Compiler, linker and archiver executables plus language-scoped flags.
///
/// Set up once while the project description is loaded; read-only while
/// targets build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    /// C compiler
    pub cc: PathBuf,

    /// C++ compiler
    pub cxx: PathBuf,

    /// CUDA compiler driver
    pub nvcc: PathBuf,

    /// Linker used for executables (a compiler driver, not raw `ld`)
    pub linker: PathBuf,

    /// Static archive tool, invoked as `<archiver> rcs <lib> <objects...>`
    pub archiver: PathBuf,

    /// Debugger front-end used by the `debug` action
    pub debugger: PathBuf,

    pub c_std: String,
    pub cxx_std: String,
    pub cuda_std: String,

    #[serde(skip)]
    flags: Vec<RegisteredFlag>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cc: PathBuf::from("gcc"),
            cxx: PathBuf::from("g++"),
            nvcc: PathBuf::from("nvcc"),
            linker: PathBuf::from("g++"),
            archiver: PathBuf::from("ar"),
            debugger: PathBuf::from("gdb"),
            c_std: "c2x".to_string(),
            cxx_std: "c++20".to_string(),
            cuda_std: "c++17".to_string(),
            flags: Vec::new(),
        }
    }
}

impl Toolchain {
    /// Register `flag` for every language in `mask`. Order of registration
    /// is the order flags appear on command lines.
    pub fn add_flag(&mut self, flag: impl Into<String>, mask: LanguageMask) {
        self.flags.push(RegisteredFlag {
            value: flag.into(),
            mask,
        });
    }

    /// Executable to invoke for `language`. `Link` maps to the linker.
    pub fn compiler_for(&self, language: Language) -> &Path {
        match language {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
            Language::Cuda => &self.nvcc,
            Language::Link => &self.linker,
        }
    }

    /// Registered flags whose mask intersects `language`.
    pub fn flags_for(&self, language: Language) -> Vec<String> {
        self.flags
            .iter()
            .filter(|f| f.mask.contains(language))
            .map(|f| f.value.clone())
            .collect()
    }

    /// `-std=` flag for `language`. Linking uses the C++ standard.
    pub fn std_flag(&self, language: Language) -> String {
        let edition = match language {
            Language::C => &self.c_std,
            Language::Cxx | Language::Link => &self.cxx_std,
            Language::Cuda => &self.cuda_std,
        };
        std_flag_gcc(edition)
    }
}

/// Normalize an edition to the GCC/Clang/nvcc `-std=` form.
pub fn std_flag_gcc(edition: &str) -> String {
    let normalized = edition.to_lowercase();
    let edition_clean = normalized.strip_prefix("-std=").unwrap_or(&normalized);

    match edition_clean {
        "c89" | "c90" => "-std=c89".to_string(),
        "c17" | "c18" => "-std=c17".to_string(),
        "c++98" | "c++03" => "-std=c++03".to_string(),
        "c++11" | "c++0x" => "-std=c++11".to_string(),
        "c++14" | "c++1y" => "-std=c++14".to_string(),
        "c++17" | "c++1z" => "-std=c++17".to_string(),
        "c++20" | "c++2a" => "-std=c++20".to_string(),
        "c++23" | "c++2b" => "-std=c++23".to_string(),
        _ => format!("-std={}", edition_clean),
    }
}
