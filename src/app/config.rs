use crate::app::models::{EffectiveConfig, ExcludePatterns, DEFAULT_MAX_FILE_SIZE};
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project-local override looked up in the root directory.
pub const PROJECT_CONFIG_FILE: &str = "aicodeprep_config.toml";

const PACKAGED_DEFAULTS: &str = include_str!("../../default_config.toml");

/// One configuration layer as read from disk. Unset keys defer to the
/// layer below.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleLayer {
    pub code_extensions: Option<Vec<String>>,
    pub exclude_extensions: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub include_dirs: Option<Vec<String>>,
    pub exclude_files: Option<Vec<String>>,
    pub include_files: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
}

impl RuleLayer {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Shallow key-level override: any key set in `upper` replaces ours.
    pub fn overridden_by(self, upper: RuleLayer) -> RuleLayer {
        RuleLayer {
            code_extensions: upper.code_extensions.or(self.code_extensions),
            exclude_extensions: upper.exclude_extensions.or(self.exclude_extensions),
            exclude_patterns: upper.exclude_patterns.or(self.exclude_patterns),
            exclude_dirs: upper.exclude_dirs.or(self.exclude_dirs),
            include_dirs: upper.include_dirs.or(self.include_dirs),
            exclude_files: upper.exclude_files.or(self.exclude_files),
            include_files: upper.include_files.or(self.include_files),
            max_file_size: upper.max_file_size.or(self.max_file_size),
        }
    }
}

fn read_layer(path: &Path) -> Result<Option<RuleLayer>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {:?}", path))?;
    let layer =
        RuleLayer::parse(&content).with_context(|| format!("Invalid config at {:?}", path))?;
    Ok(Some(layer))
}

/// Loads a layer, degrading a missing or broken file to an empty layer.
pub fn load_layer(path: &Path) -> RuleLayer {
    match read_layer(path) {
        Ok(Some(layer)) => {
            log::debug!("Loaded config layer {}", path.display());
            layer
        }
        Ok(None) => {
            log::debug!("No config at {}, skipping layer", path.display());
            RuleLayer::default()
        }
        Err(err) => {
            log::warn!("⚠️ {:#}. Ignoring this layer.", err);
            RuleLayer::default()
        }
    }
}

fn packaged_defaults() -> RuleLayer {
    RuleLayer::parse(PACKAGED_DEFAULTS).unwrap_or_else(|err| {
        log::warn!("⚠️ Packaged defaults unusable: {:#}", err);
        RuleLayer::default()
    })
}

fn user_defaults_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aicodeprep").join("default_config.toml"))
}

/// The default layer: packaged defaults, shallow-overridden by the user
/// defaults file at `user_defaults` if one exists.
pub fn default_layer(user_defaults: Option<&Path>) -> RuleLayer {
    let packaged = packaged_defaults();
    match user_defaults {
        Some(path) => packaged.overridden_by(load_layer(path)),
        None => packaged,
    }
}

/// Builds the effective configuration for `root`, honouring the user's
/// defaults file under the platform config directory.
pub fn resolve_config(root: &Path, project_config: Option<&Path>) -> Result<EffectiveConfig> {
    resolve_config_with(root, project_config, user_defaults_path().as_deref())
}

/// Like `resolve_config`, with the user defaults file given explicitly.
/// `project_config` replaces the conventional `<root>/aicodeprep_config.toml`.
pub fn resolve_config_with(
    root: &Path,
    project_config: Option<&Path>,
    user_defaults: Option<&Path>,
) -> Result<EffectiveConfig> {
    let local_path = project_config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(PROJECT_CONFIG_FILE));
    let local = load_layer(&local_path);
    EffectiveConfig::from_layers(default_layer(user_defaults), local)
}

/// Strips leading dots and lowercases, so `.PY` and `py` compare equal.
fn normalize_extensions(values: Vec<String>) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim().trim_start_matches('.').to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Every entry matches as a substring. Entries that also compile as a glob
/// additionally match whole filenames; ones that don't stay substrings only.
fn build_exclude_patterns(values: Vec<String>) -> Result<ExcludePatterns> {
    let mut substrings = Vec::new();
    let mut builder = GlobSetBuilder::new();
    for pat in values.iter().map(|v| v.trim().to_lowercase()) {
        if pat.is_empty() {
            continue;
        }
        if is_glob(&pat) {
            match GlobBuilder::new(&pat)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
            {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => {
                    log::debug!("Exclude pattern {:?} used as substring only: {}", pat, err)
                }
            }
        }
        substrings.push(pat);
    }
    let globs: GlobSet = builder.build().context("Failed to compile exclude patterns")?;
    Ok(ExcludePatterns { substrings, globs })
}

impl EffectiveConfig {
    /// Merges the default and project-local layers into the final rule set.
    pub fn from_layers(defaults: RuleLayer, local: RuleLayer) -> Result<Self> {
        let merged = defaults.overridden_by(local);
        let names = |v: Option<Vec<String>>| -> HashSet<String> {
            v.unwrap_or_default()
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Ok(Self {
            code_extensions: normalize_extensions(merged.code_extensions.unwrap_or_default()),
            exclude_extensions: normalize_extensions(
                merged.exclude_extensions.unwrap_or_default(),
            ),
            exclude_patterns: build_exclude_patterns(merged.exclude_patterns.unwrap_or_default())?,
            exclude_dirs: names(merged.exclude_dirs),
            include_dirs: names(merged.include_dirs),
            exclude_files: names(merged.exclude_files),
            include_files: names(merged.include_files),
            max_file_size: merged.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
        })
    }
}
