use crate::app::models::{extension_of, CandidateFile, EffectiveConfig, SelectedFile};

/// Why the filter pass kept or dropped a candidate. The first rule that
/// matches decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    ForcedInclude,
    ExcludedFile,
    ExcludedExtension,
    ExcludedPattern,
    Selected,
}

impl Verdict {
    pub fn is_selected(self) -> bool {
        matches!(self, Verdict::ForcedInclude | Verdict::Selected)
    }
}

/// Applies the exclusion precedence to a single candidate.
pub fn judge(candidate: &CandidateFile, config: &EffectiveConfig) -> Verdict {
    let name = candidate.file_name();

    if config.include_files.contains(name) {
        return Verdict::ForcedInclude;
    }
    if config.exclude_files.contains(name) {
        return Verdict::ExcludedFile;
    }
    if extension_of(name).is_some_and(|ext| config.exclude_extensions.contains(&ext)) {
        return Verdict::ExcludedExtension;
    }
    if config.exclude_patterns.is_match(name) {
        return Verdict::ExcludedPattern;
    }
    Verdict::Selected
}

/// Filter pass: keeps the candidates that survive `judge`, in input order.
pub fn filter_candidates(
    candidates: Vec<CandidateFile>,
    config: &EffectiveConfig,
) -> Vec<SelectedFile> {
    candidates
        .into_iter()
        .filter(|c| {
            let verdict = judge(c, config);
            if !verdict.is_selected() {
                log::debug!("Rejected {}: {:?}", c.relative_path, verdict);
            }
            verdict.is_selected()
        })
        .map(SelectedFile::from)
        .collect()
}
