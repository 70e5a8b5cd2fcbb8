use crate::app::models::{extension_of, CandidateFile, EffectiveConfig};
use anyhow::{Context, Result};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Directory pruning rules shared with the walker's entry filter.
#[derive(Debug, Clone)]
struct DirRules {
    root: PathBuf,
    exclude_dirs: HashSet<String>,
    include_dirs: HashSet<String>,
}

impl DirRules {
    /// A segment excludes its subtree when listed in `exclude_dirs`
    /// and not force-kept by `include_dirs`.
    fn is_excluded_segment(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name) && !self.include_dirs.contains(name)
    }

    /// True when any segment of `relative_dir` is an excluded directory.
    fn is_in_excluded_dir(&self, relative_dir: &Path) -> bool {
        segments(relative_dir).any(|s| self.is_excluded_segment(&s))
    }

    /// Decides whether the walker descends into `entry`. Files always pass;
    /// they are judged later in `Scanner::process_entry`.
    fn keeps(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        let keep = if name.starts_with('.') {
            false
        } else if self.include_dirs.contains(name.as_ref()) {
            true
        } else {
            !self.exclude_dirs.contains(name.as_ref())
        };

        let keep = keep
            && match diff_paths(entry.path(), &self.root) {
                Some(rel) => !self.is_in_excluded_dir(&rel),
                None => true,
            };
        if !keep {
            log::debug!("Pruned directory {}", entry.path().display());
        }
        keep
    }
}

fn segments(path: &Path) -> impl Iterator<Item = String> + '_ {
    path.components().filter_map(|c| match c {
        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
        _ => None,
    })
}

fn is_hidden(relative: &Path) -> bool {
    segments(relative).any(|s| s.starts_with('.'))
}

/// Discovery pass: walks the tree once and yields candidate files.
pub struct Scanner<'a> {
    root: PathBuf,
    config: &'a EffectiveConfig,
    dir_rules: Arc<DirRules>,
    respect_gitignore: bool,
    skip_path: Option<PathBuf>,
}

impl<'a> Scanner<'a> {
    pub fn new(root: impl AsRef<Path>, config: &'a EffectiveConfig) -> Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("Cannot open root directory {}", root.display()))?;
        let dir_rules = Arc::new(DirRules {
            root: root.clone(),
            exclude_dirs: config.exclude_dirs.clone(),
            include_dirs: config.include_dirs.clone(),
        });
        Ok(Self {
            root,
            config,
            dir_rules,
            respect_gitignore: false,
            skip_path: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Also skip paths matched by `.gitignore` files.
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.respect_gitignore = yes;
        self
    }

    /// Never report this path as a candidate (used for the output file).
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_path = Some(path.into());
        self
    }

    /// Walks depth-first with children sorted by name, so the result is
    /// in lexicographic path order and stable between runs.
    pub fn scan(&self) -> Vec<CandidateFile> {
        let mut candidates = Vec::new();

        let rules = Arc::clone(&self.dir_rules);
        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| rules.keeps(entry))
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if let Some(candidate) = self.process_entry(&entry) {
                        candidates.push(candidate);
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        log::debug!("Discovery found {} candidates", candidates.len());
        candidates
    }

    fn process_entry(&self, entry: &DirEntry) -> Option<CandidateFile> {
        let path = entry.path();
        // Symlinks are resolved by the size check below.
        if !entry
            .file_type()
            .is_some_and(|t| t.is_file() || t.is_symlink())
        {
            return None;
        }
        if self.skip_path.as_deref() == Some(path) {
            log::debug!("Skipping output file {}", path.display());
            return None;
        }

        let relative = diff_paths(path, &self.root)?;
        if is_hidden(&relative) {
            log::debug!("Skipping hidden {}", relative.display());
            return None;
        }
        if let Some(parent) = relative.parent() {
            if self.dir_rules.is_in_excluded_dir(parent) {
                log::debug!("Skipping {} in excluded directory", relative.display());
                return None;
            }
        }

        let size = match path.metadata() {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return None,
            Err(err) => {
                log::warn!("Skipping {}: cannot read size: {}", path.display(), err);
                return None;
            }
        };
        if size > self.config.max_file_size {
            log::warn!("Skipping {}: File too large ({} bytes)", path.display(), size);
            return None;
        }

        let file_name = entry.file_name().to_string_lossy();
        let is_code = extension_of(&file_name)
            .is_some_and(|ext| self.config.code_extensions.contains(&ext));
        if !is_code && !self.config.include_files.contains(file_name.as_ref()) {
            return None;
        }

        Some(CandidateFile {
            path: path.to_path_buf(),
            relative_path: relative.to_string_lossy().replace('\\', "/"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config() -> EffectiveConfig {
        EffectiveConfig {
            code_extensions: HashSet::from(["py".to_string()]),
            exclude_dirs: HashSet::from([".git".to_string(), "build".to_string()]),
            include_files: HashSet::from(["notes.txt".to_string()]),
            ..Default::default()
        }
    }

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative(candidates: &[CandidateFile]) -> Vec<&str> {
        candidates.iter().map(|c| c.relative_path.as_str()).collect()
    }

    #[test]
    fn selects_by_extension_and_include_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.py", "print('a')\n");
        touch(dir.path(), "b.md", "# b\n");
        touch(dir.path(), "notes.txt", "notes\n");
        touch(dir.path(), ".git/config", "[core]\n");

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["a.py", "notes.txt"]);
    }

    #[test]
    fn prunes_excluded_and_hidden_directories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "build/gen.py", "");
        touch(dir.path(), "src/build/nested.py", "");
        touch(dir.path(), ".hidden/x.py", "");
        touch(dir.path(), "src/.cache/y.py", "");
        touch(dir.path(), "src/.secret.py", "");
        touch(dir.path(), "src/main.py", "");

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["src/main.py"]);
    }

    #[test]
    fn include_dirs_force_keeps_excluded_name() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "build/gen.py", "");
        touch(dir.path(), "dist/out.py", "");

        let mut config = config();
        config.exclude_dirs.insert("dist".to_string());
        config.include_dirs.insert("build".to_string());
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["build/gen.py"]);
    }

    #[test]
    fn size_limit_is_inclusive() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "exact.py", &"x".repeat(10));
        touch(dir.path(), "over.py", &"x".repeat(11));

        let mut config = config();
        config.max_file_size = 10;
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["exact.py"]);
    }

    #[test]
    fn order_is_lexicographic_by_path() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "c.py", "");
        touch(dir.path(), "b/z.py", "");
        touch(dir.path(), "a.py", "");
        touch(dir.path(), "b/a.py", "");

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(
            relative(&scanner.scan()),
            vec!["a.py", "b/a.py", "b/z.py", "c.py"]
        );
    }

    #[test]
    fn skip_path_is_never_a_candidate() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.py", "");
        touch(dir.path(), "notes.txt", "");

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        let skip = scanner.root().join("notes.txt");
        let scanner = scanner.skip_path(skip);
        assert_eq!(relative(&scanner.scan()), vec!["a.py"]);
    }

    #[test]
    fn gitignore_is_opt_in() {
        let dir = tempdir().unwrap();
        touch(dir.path(), ".gitignore", "generated.py\n");
        touch(dir.path(), "generated.py", "");
        touch(dir.path(), "main.py", "");

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["generated.py", "main.py"]);

        let scanner = Scanner::new(dir.path(), &config)
            .unwrap()
            .respect_gitignore(true);
        assert_eq!(relative(&scanner.scan()), vec!["main.py"]);
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_size_skips_only_that_file() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.py", "");
        touch(dir.path(), "z.py", "");
        std::os::unix::fs::symlink(dir.path().join("gone.py"), dir.path().join("m.py")).unwrap();

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["a.py", "z.py"]);
    }

    #[test]
    #[cfg(unix)]
    fn symlinks_to_files_are_followed_but_not_to_dirs() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "real/lib.py", "");
        std::os::unix::fs::symlink(dir.path().join("real/lib.py"), dir.path().join("link.py"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias.py")).unwrap();

        let config = config();
        let scanner = Scanner::new(dir.path(), &config).unwrap();
        assert_eq!(relative(&scanner.scan()), vec!["link.py", "real/lib.py"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let config = config();
        assert!(Scanner::new(dir.path().join("absent"), &config).is_err());
    }
}
