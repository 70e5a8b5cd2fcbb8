//! Walks a project tree, selects source files by extension, name and size
//! rules, and concatenates them into a single labeled text file.

pub mod app;

pub use app::config::{resolve_config, resolve_config_with, RuleLayer};
pub use app::filter::filter_candidates;
pub use app::formatter::{write_output_file, write_records};
pub use app::models::{CandidateFile, EffectiveConfig, SelectedFile};
pub use app::scanner::Scanner;
