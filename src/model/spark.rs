// src/model/spark.rs

use std::io;

use tracing::debug;

use crate::errors::SpawnError;
use crate::model::block::Block;
use crate::process::lines::{drain_lines, Drained};
use crate::process::{ProcessHandle, StreamMode, Streams};
use crate::types::BlockKind;

/// What the spark's lines are used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparkFeed {
    /// Lines become the target block's pending input and trigger a run.
    Input,
    /// Lines are the target block's result (live blocks).
    Output,
}

/// A long-running producer feeding one block.
///
/// The spark refers to its block by index into the scheduler's block list;
/// it never owns the block.
#[derive(Debug)]
pub struct Spark {
    pub handle: ProcessHandle,
    target: usize,
    feed: SparkFeed,
    carry: Vec<u8>,
    alive: bool,
}

impl Spark {
    /// The spark for `block`, if its kind needs one.
    ///
    /// Sparked blocks get their `trigger` command; live blocks run their own
    /// command as the spark.
    pub fn for_block(target: usize, block: &Block) -> Option<Self> {
        let (command, feed) = match block.kind() {
            BlockKind::Sparked => (block.config().trigger.clone()?, SparkFeed::Input),
            BlockKind::Live => (
                block.config().effective_command(block.sid()).to_string(),
                SparkFeed::Output,
            ),
            BlockKind::Once | BlockKind::Timed => return None,
        };
        Some(Self {
            handle: ProcessHandle::new(command),
            target,
            feed,
            carry: Vec::new(),
            alive: false,
        })
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn feed(&self) -> SparkFeed {
        self.feed
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Start the spark with a non-blocking stdout.
    pub fn open(&mut self) -> Result<u32, SpawnError> {
        let pid = self.handle.spawn(Streams::OUT, StreamMode::NonBlocking)?;
        self.alive = true;
        Ok(pid)
    }

    /// Read everything the spark has written since the last drain, in lines
    /// of at most `limit` bytes.
    pub fn drain(&mut self, limit: usize) -> io::Result<Drained> {
        match self.handle.stdout_mut() {
            Some(stdout) => drain_lines(stdout, &mut self.carry, limit),
            None => Ok(Drained {
                lines: Vec::new(),
                eof: true,
            }),
        }
    }

    /// Stop the spark: SIGTERM, then drop its pipes. The pid is kept until
    /// the reaper collects it.
    pub fn close(&mut self) {
        if self.alive {
            debug!(pid = self.handle.pid(), cmd = self.handle.command(), "closing spark");
        }
        self.handle.terminate(libc::SIGTERM);
        self.handle.close();
        self.carry.clear();
        self.alive = false;
    }
}
