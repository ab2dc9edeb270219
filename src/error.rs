//! Fatal error kinds and their pinned process exit codes (spec §7/§13).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PffdtdError {
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("allocation failed for a grid of {sx}x{sy}x{sz} cells")]
    AllocFail { sx: usize, sy: usize, sz: usize },

    #[error("malformed scenario file {path}: {reason}")]
    ScenarioFormat { path: PathBuf, reason: String },

    #[error("failed to install SIGINT handler: {source}")]
    SignalSetup {
        #[source]
        source: ctrlc::Error,
    },
}

impl PffdtdError {
    /// Exit code pinned by spec §6.1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileOpen { .. } => 1,
            Self::AllocFail { .. } => 2,
            Self::ScenarioFormat { .. } => 3,
            Self::SignalSetup { .. } => 4,
        }
    }
}
