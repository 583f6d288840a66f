//! Error types for the marquee shell core.

/// Top-level error type for the schedule shell.
///
/// Fetch-side failures never appear here: the engine contains them within a
/// cycle and keeps the last accepted schedule. Only configuration problems
/// are fatal, surfaced at startup before the first cycle runs.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Invalid or missing configuration. Fatal at engine start.
    #[error("config error: {0}")]
    Config(String),

    /// Engine pipeline coordination error.
    #[error("engine error: {0}")]
    Engine(String),

    /// Event channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ShellError>;
