// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LemonfeedError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Spawn error: {0}")]
    Spawn(#[from] SpawnError),

    /// The renderer stopped accepting input or could not be started.
    #[error("Renderer gone: {0}")]
    RendererGone(String),

    #[error("Multiplexer error: {0}")]
    Multiplexer(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a [`crate::process::ProcessHandle`] could not be opened.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("process already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("empty command")]
    EmptyCommand,

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Why a single block invocation produced no result.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("reading output failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("command exited without printing a line")]
    NoOutput,
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LemonfeedError>;
