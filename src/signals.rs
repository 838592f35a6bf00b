// src/signals.rs

//! Signal handling without doing work in signal context.
//!
//! Handlers only flip atomic flags (via `signal-hook`) and write a byte to a
//! self-pipe so the multiplexer wakes up. The scheduler samples the flags
//! once per tick:
//! - SIGINT, SIGTERM, SIGQUIT, SIGPIPE request a graceful shutdown,
//! - SIGCHLD asks the loop to reap exited children.

use std::io::{self, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::SigId;
use signal_hook::consts::{SIGCHLD, SIGINT, SIGPIPE, SIGQUIT, SIGTERM};
use tracing::debug;

pub const SHUTDOWN_SIGNALS: [libc::c_int; 4] = [SIGINT, SIGTERM, SIGQUIT, SIGPIPE];

#[derive(Debug)]
pub struct SignalFlags {
    shutdown: Arc<AtomicBool>,
    child_exited: Arc<AtomicBool>,
    waker: Option<UnixStream>,
    ids: Vec<SigId>,
}

impl SignalFlags {
    /// Install process-wide handlers for the shutdown signals and SIGCHLD.
    pub fn install() -> io::Result<Self> {
        let mut flags = Self::detached();

        let (reader, writer) = UnixStream::pair()?;
        reader.set_nonblocking(true)?;
        writer.set_nonblocking(true)?;

        for signal in SHUTDOWN_SIGNALS {
            flags
                .ids
                .push(signal_hook::flag::register(signal, Arc::clone(&flags.shutdown))?);
            flags
                .ids
                .push(signal_hook::low_level::pipe::register(signal, writer.try_clone()?)?);
        }
        flags
            .ids
            .push(signal_hook::flag::register(SIGCHLD, Arc::clone(&flags.child_exited))?);
        flags
            .ids
            .push(signal_hook::low_level::pipe::register(SIGCHLD, writer)?);

        flags.waker = Some(reader);
        debug!("signal handlers installed");
        Ok(flags)
    }

    /// Flags that no OS signal will ever set. Used when the caller drives
    /// the scheduler itself (tests, embedding).
    pub fn detached() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            child_exited: Arc::new(AtomicBool::new(false)),
            waker: None,
            ids: Vec::new(),
        }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns whether SIGCHLD arrived since the last call, and resets it.
    pub fn take_child_exited(&self) -> bool {
        self.child_exited.swap(false, Ordering::SeqCst)
    }

    pub fn notify_child_exited(&self) {
        self.child_exited.store(true, Ordering::SeqCst);
    }

    /// Descriptor that becomes readable whenever a handled signal arrives.
    pub fn wake_fd(&self) -> Option<RawFd> {
        self.waker.as_ref().map(|w| w.as_raw_fd())
    }

    /// Empty the self-pipe so the next signal is reported again.
    pub fn drain_wakeups(&mut self) {
        let Some(waker) = self.waker.as_mut() else {
            return;
        };
        let mut buf = [0u8; 64];
        loop {
            match waker.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }
}

impl Drop for SignalFlags {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}
