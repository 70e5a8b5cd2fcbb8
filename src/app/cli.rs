use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Concatenate code files into a single text file"
)]
pub struct Cli {
    /// Project root to walk (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Do NOT copy output to clipboard (default: copy to clipboard)
    #[arg(short = 'n', long)]
    pub no_copy: bool,

    /// Output file name
    #[arg(short, long, default_value = "fullcode.txt")]
    pub output: PathBuf,

    /// Project config file (default: <DIR>/aicodeprep_config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also skip files ignored by .gitignore
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
