use thiserror::Error;

/// Exit code reported when the command could not be started at all.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code for failures of ztime itself (signal setup, waiting on the child).
pub const INTERNAL_FAILURE_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum ZtimeError {
    #[error("no command given")]
    EmptyCommand,

    #[error("failed to execute '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to subscribe to signals: {0}")]
    SignalSetup(#[source] std::io::Error),

    #[error("failed to wait for child process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ZtimeError {
    /// The process exit code ztime should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ZtimeError::Launch { .. } => LAUNCH_FAILURE_EXIT_CODE,
            _ => INTERNAL_FAILURE_EXIT_CODE,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZtimeError>;
