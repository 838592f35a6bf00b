// src/process/mod.rs

//! Child process layer.
//!
//! - [`handle`] owns one spawned command: its pid and standard streams.
//! - [`command`] turns command strings into argv without a shell.
//! - [`lines`] reads a single bounded line, or drains non-blocking pipes.
//! - [`reap`] collects exited children after SIGCHLD.

pub mod command;
pub mod handle;
pub mod lines;
pub mod reap;

pub use command::{build_command, spawn_detached, split_command};
pub use handle::{ProcessHandle, StreamMode, Streams};
pub use lines::{drain_lines, read_line_bounded, read_line_with_timeout, Drained};
pub use reap::{reap_children, Reaped};
