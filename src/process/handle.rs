// src/process/handle.rs

//! Ownership of one spawned child and its standard streams.

use std::io::{self, BufReader, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::process::{ChildStderr, ChildStdin, ChildStdout, Stdio};

use tracing::{debug, trace};

use crate::errors::SpawnError;
use crate::process::command::build_command;
use crate::types::StreamDir;

/// Which of the child's standard streams to connect to pipes.
///
/// Unrequested streams are connected to `/dev/null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streams {
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
}

impl Streams {
    /// Only stdout: block invocations and sparks.
    pub const OUT: Streams = Streams {
        stdin: false,
        stdout: true,
        stderr: false,
    };

    /// stdin and stdout: the renderer.
    pub const IN_OUT: Streams = Streams {
        stdin: true,
        stdout: true,
        stderr: false,
    };

    fn any(self) -> bool {
        self.stdin || self.stdout || self.stderr
    }
}

/// How the child's output streams are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Blocking reads, one line at a time (short-lived invocations).
    LineBuffered,
    /// `O_NONBLOCK` on every output pipe (sparks, the renderer).
    NonBlocking,
}

/// A command plus, while it runs, its pid and pipes.
///
/// A pid of 0 means "not running". The pid is only cleared once the child
/// has been reaped, so a handle whose child exited but was not yet collected
/// still refuses to spawn again.
#[derive(Debug)]
pub struct ProcessHandle {
    command: String,
    args: Vec<String>,
    argument: Option<String>,
    pid: u32,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    stderr: Option<BufReader<ChildStderr>>,
}

impl ProcessHandle {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            argument: None,
            pid: 0,
            stdin: None,
            stdout: None,
            stderr: None,
        }
    }

    /// Fixed arguments appended after the command's own tokens on every spawn.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Set (or clear) the single per-run argument, appended as one argv entry.
    pub fn set_argument(&mut self, argument: Option<String>) {
        self.argument = argument;
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn is_running(&self) -> bool {
        self.pid > 0
    }

    /// Start the command.
    ///
    /// Fails if this handle already owns a running (unreaped) child, if the
    /// command is empty or malformed, or if `execvp` fails.
    pub fn spawn(&mut self, streams: Streams, mode: StreamMode) -> Result<u32, SpawnError> {
        if self.pid > 0 {
            return Err(SpawnError::AlreadyRunning { pid: self.pid });
        }
        if self.command.trim().is_empty() {
            return Err(SpawnError::EmptyCommand);
        }
        if !streams.any() {
            return Err(SpawnError::InvalidCommand(
                "a process handle needs at least one stream".to_string(),
            ));
        }

        let extra = self.args.iter().chain(self.argument.iter());
        let mut command = build_command(&self.command, extra)?;
        command
            .stdin(pipe_or_null(streams.stdin))
            .stdout(pipe_or_null(streams.stdout))
            .stderr(pipe_or_null(streams.stderr));

        let mut child = command.spawn()?;
        let pid = child.id();

        self.stdin = child.stdin.take();
        self.stdout = child.stdout.take().map(BufReader::new);
        self.stderr = child.stderr.take().map(BufReader::new);
        self.pid = pid;

        // `child` is dropped without waiting; the reaper collects it.
        drop(child);

        if mode == StreamMode::NonBlocking {
            if let Some(fd) = self.raw_fd(StreamDir::Out) {
                set_nonblocking(fd)?;
            }
            if let Some(fd) = self.raw_fd(StreamDir::Err) {
                set_nonblocking(fd)?;
            }
        }

        debug!(
            cmd = %self.command,
            arg = ?self.argument,
            pid,
            ?mode,
            "spawned child process"
        );
        Ok(pid)
    }

    /// Raw descriptor of one of the owned streams, if open.
    pub fn raw_fd(&self, dir: StreamDir) -> Option<RawFd> {
        match dir {
            StreamDir::In => self.stdin.as_ref().map(|s| s.as_raw_fd()),
            StreamDir::Out => self.stdout.as_ref().map(|s| s.get_ref().as_raw_fd()),
            StreamDir::Err => self.stderr.as_ref().map(|s| s.get_ref().as_raw_fd()),
        }
    }

    pub fn stdout_mut(&mut self) -> Option<&mut BufReader<ChildStdout>> {
        self.stdout.as_mut()
    }

    /// Write one newline-terminated line to the child's stdin and flush it.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin is not open"))?;
        stdin.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            stdin.write_all(b"\n")?;
        }
        stdin.flush()
    }

    /// Send `signal` to the child. Pids 0 and 1 are never signalled.
    ///
    /// The pid stays set until the child is reaped.
    pub fn terminate(&self, signal: libc::c_int) -> bool {
        if self.pid <= 1 {
            return false;
        }
        trace!(pid = self.pid, signal, "signalling child");
        // SAFETY: kill(2) has no memory-safety preconditions.
        unsafe { libc::kill(self.pid as libc::pid_t, signal) == 0 }
    }

    /// Collect this handle's child if it has exited, without blocking.
    ///
    /// Returns `true` if the handle no longer owns a pid afterwards.
    pub fn try_reap(&mut self) -> bool {
        if self.pid == 0 {
            return true;
        }
        let mut status: libc::c_int = 0;
        // SAFETY: `status` is a valid out-pointer for the duration of the call.
        let rc = unsafe { libc::waitpid(self.pid as libc::pid_t, &mut status, libc::WNOHANG) };
        let gone = rc == self.pid as libc::pid_t
            || (rc == -1 && io::Error::last_os_error().raw_os_error() == Some(libc::ECHILD));
        if gone {
            self.pid = 0;
        }
        gone
    }

    /// Record that the child was collected elsewhere (by the reaper).
    pub fn mark_reaped(&mut self) {
        self.pid = 0;
    }

    /// Close every owned stream. Idempotent.
    pub fn close(&mut self) {
        self.stdin = None;
        self.stdout = None;
        self.stderr = None;
    }

    pub fn has_open_streams(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some() || self.stderr.is_some()
    }
}

fn pipe_or_null(wanted: bool) -> Stdio {
    if wanted { Stdio::piped() } else { Stdio::null() }
}

/// Put a descriptor into non-blocking mode.
pub fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    // SAFETY: fcntl on a descriptor we own; no pointers involved.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
