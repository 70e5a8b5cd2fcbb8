//! Clipboard sink. Shells out to whichever clipboard tool the platform has.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Anything that accepts the full output text as one string.
pub trait Clipboard {
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Tmux,
    Xclip,
    Xsel,
    Wayland,
    MacOS,
    Wsl,
    Termux,
}

impl Provider {
    fn program(self) -> &'static str {
        match self {
            Self::Tmux => "tmux",
            Self::Xclip => "xclip",
            Self::Xsel => "xsel",
            Self::Wayland => "wl-copy",
            Self::MacOS => "pbcopy",
            Self::Wsl => "clip.exe",
            Self::Termux => "termux-clipboard-set",
        }
    }

    fn args(self) -> &'static [&'static str] {
        match self {
            Self::Tmux => &["load-buffer", "-w", "-"],
            Self::Xclip => &["-selection", "clipboard", "-in"],
            Self::Xsel => &["-b", "-i"],
            Self::Wayland | Self::MacOS | Self::Wsl | Self::Termux => &[],
        }
    }
}

impl Clipboard for Provider {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        execute_clipboard_command(self.program(), self.args(), text)
    }
}

/// The system clipboard, resolved lazily on each copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let providers = candidate_providers();
        let Some(first) = providers.first() else {
            return Err(ClipboardError::NoClipboardFound);
        };
        log::debug!("Copying with {:?}", first);
        first.copy_to_clipboard(text)
    }
}

fn execute_clipboard_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

    {
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
        })?;
        stdin.write_all(text.as_bytes())?;
    }
    // Closing stdin lets the tool see EOF.
    drop(child.stdin.take());

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

/// True if `command` is an executable on `PATH`.
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH").is_some_and(|paths| {
        env::split_paths(&paths).any(|dir| Path::new(&dir).join(command).is_file())
    })
}

fn platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "android") {
        "android"
    } else if cfg!(target_os = "linux") {
        if env::var_os("WSL_DISTRO_NAME").is_some() {
            "wsl"
        } else {
            "linux"
        }
    } else {
        "unknown"
    }
}

/// Providers in order of preference for this machine.
fn candidate_providers() -> Vec<Provider> {
    let mut providers = Vec::new();

    match platform() {
        "macos" => providers.push(Provider::MacOS),
        "windows" | "wsl" => providers.push(Provider::Wsl),
        "android" => providers.push(Provider::Termux),
        "linux" => {
            if env::var_os("WAYLAND_DISPLAY").is_some() {
                providers.push(Provider::Wayland);
            }
            providers.extend([Provider::Xsel, Provider::Xclip]);
        }
        _ => {}
    }
    if env::var_os("TMUX").is_some() {
        providers.push(Provider::Tmux);
    }

    providers
        .into_iter()
        .filter(|p| command_exists(p.program()))
        .collect()
}
