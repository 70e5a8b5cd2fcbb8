use globset::GlobSet;
use std::collections::HashSet;
use std::path::PathBuf;

/// Fallback byte ceiling when no configuration layer sets `max_file_size`.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// The merged rule set used for one run. Built once, never mutated.
///
/// Extensions are stored lowercase without the leading dot, exclusion
/// patterns are stored lowercase. Directory and file names are verbatim.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub code_extensions: HashSet<String>,
    pub exclude_extensions: HashSet<String>,
    pub exclude_patterns: ExcludePatterns,
    pub exclude_dirs: HashSet<String>,
    pub include_dirs: HashSet<String>,
    pub exclude_files: HashSet<String>,
    pub include_files: HashSet<String>,
    pub max_file_size: u64,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            code_extensions: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: ExcludePatterns::default(),
            exclude_dirs: HashSet::new(),
            include_dirs: HashSet::new(),
            exclude_files: HashSet::new(),
            include_files: HashSet::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Case-insensitive filename patterns. Every entry matches as a substring;
/// entries that compile as globs also match the whole filename.
#[derive(Debug, Clone)]
pub struct ExcludePatterns {
    pub substrings: Vec<String>,
    pub globs: GlobSet,
}

impl Default for ExcludePatterns {
    fn default() -> Self {
        Self {
            substrings: Vec::new(),
            globs: GlobSet::empty(),
        }
    }
}

impl ExcludePatterns {
    pub fn is_match(&self, file_name: &str) -> bool {
        let lowered = file_name.to_lowercase();
        self.substrings.iter().any(|s| lowered.contains(s.as_str()))
            || self.globs.is_match(&lowered)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty() && self.globs.is_empty()
    }
}

/// A file that passed discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// Relative to the walk root, always `/`-separated.
    pub relative_path: String,
}

impl CandidateFile {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// A candidate that survived the filter pass and will be concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub relative_path: String,
}

impl From<CandidateFile> for SelectedFile {
    fn from(c: CandidateFile) -> Self {
        Self {
            path: c.path,
            relative_path: c.relative_path,
        }
    }
}

/// Lowercased extension without the dot, or `None` for names like `Makefile`.
pub fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}
