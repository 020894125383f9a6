/// Error types for the terminal, persistence and signal layers.

use std::io;

use thiserror::Error;

/// Fatal terminal failures. The terminal has already restored itself
/// by the time one of these reaches a caller.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("could not configure the terminal: {0}")]
    Setup(#[source] io::Error),
    #[error("end of input")]
    Eof,
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("a signal router is already installed")]
    AlreadyInstalled,
    #[error("signal {0} is not watched by this router")]
    NotWatched(i32),
    #[error("could not install signal handlers: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("could not create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("could not install logger: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
