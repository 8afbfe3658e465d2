use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors. Anything here stops the run before a Report is produced.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Homebrew not found and could not be installed")]
    ToolNotFound,

    #[error("brew-sync only runs on macOS (detected: {0})")]
    UnsupportedPlatform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing config file: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single external `brew` invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` exited with {}", exit_detail(.code, .stderr))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_detail(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    };
    match stderr.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => format!("{status}: {line}"),
        None => status,
    }
}

/// Failure of one probe inside a batch. Never escapes the batch runner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("timed out after {:?}", .0)]
    TimedOut(Duration),

    #[error("probe panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
