// src/engine/runner.rs

//! How a due block is actually run.
//!
//! The scheduler talks to a [`BlockRunner`] instead of spawning processes
//! itself, so tests can swap in a runner that hands back scripted lines.
//! [`ProcessRunner`] is the implementation used by `lemonfeed`.

use std::time::Duration;

use tracing::trace;

use crate::errors::{RunError, SpawnError};
use crate::model::Block;
use crate::process::lines::{read_line_bounded, read_line_with_timeout};
use crate::process::{StreamMode, Streams};
use crate::types::StreamDir;

/// Runs one block invocation and returns the line it printed.
pub trait BlockRunner {
    fn run_block(&mut self, block: &mut Block, argument: Option<String>) -> Result<String, RunError>;
}

/// Spawns the block's command, reads one line, and closes the handle.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    line_limit: usize,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(line_limit: usize, timeout: Option<Duration>) -> Self {
        Self {
            line_limit: line_limit.max(1),
            timeout,
        }
    }
}

impl BlockRunner for ProcessRunner {
    fn run_block(&mut self, block: &mut Block, argument: Option<String>) -> Result<String, RunError> {
        let handle = &mut block.handle;

        // The previous invocation may have exited without SIGCHLD having
        // been processed yet.
        if handle.is_running() && !handle.try_reap() {
            return Err(SpawnError::AlreadyRunning { pid: handle.pid() }.into());
        }

        handle.set_argument(argument);
        handle.spawn(Streams::OUT, StreamMode::LineBuffered)?;

        let fd = handle.raw_fd(StreamDir::Out);
        let line = match (handle.stdout_mut(), fd) {
            (Some(stdout), Some(fd)) => match self.timeout {
                Some(timeout) => read_line_with_timeout(stdout, fd, self.line_limit, timeout),
                None => read_line_bounded(stdout, self.line_limit),
            },
            _ => Ok(None),
        };

        handle.close();
        handle.terminate(libc::SIGTERM);
        trace!(pid = handle.pid(), "block invocation closed");

        line?.ok_or(RunError::NoOutput)
    }
}
