/*!
 * Clipboard support for prompt-perfect
 *
 * Copies the assembled prompt through whichever clipboard command the
 * system provides. Detection runs once per process.
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use once_cell::sync::Lazy;
use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Something that can receive text
pub trait Clipboard {
    /// Copy text to the clipboard
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Clipboard commands we know how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    Tmux,
    Xclip,
    Xsel,
    Wayland,
    MacOS,
    Wsl,
    Termux,
}

impl ClipboardProvider {
    /// Program and arguments reading the text from stdin
    pub fn command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::MacOS => ("pbcopy", &[]),
            Self::Wsl => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }
}

impl Clipboard for ClipboardProvider {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let (cmd, args) = self.command();
        log::debug!("Copying {} bytes with {}", text.len(), cmd);
        pipe_to_command(cmd, args, text)
    }
}

/// Host platform as far as clipboard selection is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    MacOS,
    Windows,
    Wsl,
    Linux,
    Android,
    Unknown,
}

static PLATFORM: Lazy<Platform> = Lazy::new(|| {
    if cfg!(target_os = "macos") {
        Platform::MacOS
    } else if cfg!(target_os = "windows") {
        Platform::Windows
    } else if cfg!(target_os = "android") {
        Platform::Android
    } else if cfg!(target_os = "linux") {
        if env::var("WSL_DISTRO_NAME").is_ok() {
            Platform::Wsl
        } else {
            Platform::Linux
        }
    } else {
        Platform::Unknown
    }
});

fn platform() -> Platform {
    *PLATFORM
}

/// Copy text using the first available provider
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let provider = detect_providers()
        .into_iter()
        .next()
        .ok_or(ClipboardError::NoClipboardFound)?;
    provider.copy_to_clipboard(text)
}

/// Providers usable on this system, most preferred first
pub fn detect_providers() -> Vec<ClipboardProvider> {
    let mut providers = Vec::with_capacity(3);

    // tmux wins when we run inside a session
    if command_exists("tmux") && env::var("TMUX").is_ok() {
        providers.push(ClipboardProvider::Tmux);
    }

    let candidates: &[ClipboardProvider] = match platform() {
        Platform::MacOS => &[ClipboardProvider::MacOS],
        Platform::Windows | Platform::Wsl => &[ClipboardProvider::Wsl],
        Platform::Linux => &[
            ClipboardProvider::Wayland,
            ClipboardProvider::Xsel,
            ClipboardProvider::Xclip,
        ],
        Platform::Android => &[ClipboardProvider::Termux],
        Platform::Unknown => &[],
    };

    providers.extend(
        candidates
            .iter()
            .copied()
            .filter(|p| command_exists(p.command().0)),
    );
    log::trace!("Clipboard providers: {:?}", providers);
    providers
}

/// Whether `command` is found on PATH
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
        .unwrap_or(false)
}

fn pipe_to_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
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
    // Close stdin so the command sees EOF
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
