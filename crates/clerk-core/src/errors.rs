//! Error types and exit statuses for command dispatch
//!
//! Failures are split by where they are recovered. Anything raised inside a
//! command body is caught at the execution boundary and turned into a
//! `Failure` status. Dispatch failures (unknown names, bad input, re-entry)
//! travel up to whoever asked for the dispatch, which is either a nested
//! `call` inside another command or the top-level `run`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Command \"{0}\" is not defined.")]
    CommandNotFound(String),
    #[error("Command \"{0}\" is already running.")]
    CommandRunning(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Format(String),
    #[error("Prompt failed: {0}")]
    Prompt(String),
    #[error("Lock error for '{name}': {message}")]
    Lock { name: String, message: String },
    #[error("{0}")]
    DateRange(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for ConsoleError {
    fn from(err: dialoguer::Error) -> Self {
        ConsoleError::Prompt(err.to_string())
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Process exit status of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status.code()
    }
}
