//! Host checks and Homebrew discovery.
//!
//! Homebrew lives in a different prefix depending on the CPU:
//! - **Apple Silicon**: `/opt/homebrew/bin/brew`
//! - **Intel**: `/usr/local/bin/brew`
//!
//! `HOMEBREW_PREFIX` wins over both when set, and the first `brew` on `PATH`
//! is the last resort. If nothing turns up, [`bootstrap_homebrew`] runs the
//! official install script and discovery is repeated.

use crate::error::{Result, SyncError};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Refuse to run anywhere but macOS.
pub fn require_macos() -> Result<()> {
    check_os(std::env::consts::OS)
}

fn check_os(os: &str) -> Result<()> {
    if os == "macos" {
        Ok(())
    } else {
        Err(SyncError::UnsupportedPlatform(os.to_string()))
    }
}

/// Default brew location for this CPU architecture.
pub fn default_brew_path() -> PathBuf {
    #[cfg(target_arch = "aarch64")]
    {
        PathBuf::from("/opt/homebrew/bin/brew")
    }
    #[cfg(not(target_arch = "aarch64"))]
    {
        PathBuf::from("/usr/local/bin/brew")
    }
}

/// Find an existing brew binary, or `None` if Homebrew isn't installed.
pub fn locate_brew() -> Option<PathBuf> {
    let prefix = std::env::var_os("HOMEBREW_PREFIX").map(PathBuf::from);
    let path = std::env::var_os("PATH");
    locate_brew_in(prefix.as_deref(), path.as_deref())
}

fn locate_brew_in(prefix: Option<&Path>, path: Option<&std::ffi::OsStr>) -> Option<PathBuf> {
    let candidates = prefix
        .map(|p| p.join("bin/brew"))
        .into_iter()
        .chain(std::iter::once(default_brew_path()));

    for candidate in candidates {
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    find_in_path("brew", path?)
}

fn find_in_path(binary: &str, path: &std::ffi::OsStr) -> Option<PathBuf> {
    std::env::split_paths(path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Resolve the brew binary to use for this run.
///
/// An explicit path must exist. Otherwise discovery runs, and when nothing is
/// found and `allow_bootstrap` is set, Homebrew gets installed first.
pub fn discover_brew(explicit: Option<PathBuf>, allow_bootstrap: bool) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path)
        } else {
            tracing::warn!("brew not found at {}", path.display());
            Err(SyncError::ToolNotFound)
        };
    }

    if let Some(path) = locate_brew() {
        tracing::debug!("using brew at {}", path.display());
        return Ok(path);
    }

    if !allow_bootstrap {
        return Err(SyncError::ToolNotFound);
    }

    println!("{} Homebrew not found, installing...", "→".cyan());
    bootstrap_homebrew()
}

/// Install Homebrew with the upstream script, then look for it again.
pub fn bootstrap_homebrew() -> Result<PathBuf> {
    tracing::debug!("running Homebrew installer from {}", HOMEBREW_INSTALL_URL);

    let script = format!("/bin/bash -c \"$(curl -fsSL {HOMEBREW_INSTALL_URL})\"");
    let status = Command::new("/bin/bash").args(["-c", &script]).status();

    match status {
        Ok(status) if status.success() => locate_brew().ok_or(SyncError::ToolNotFound),
        Ok(status) => {
            tracing::warn!("Homebrew installer exited with {}", status);
            Err(SyncError::ToolNotFound)
        }
        Err(e) => {
            tracing::warn!("failed to start Homebrew installer: {}", e);
            Err(SyncError::ToolNotFound)
        }
    }
}
