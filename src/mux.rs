// src/mux.rs

//! Readiness multiplexer over `mio` (epoll on Linux).
//!
//! Registrations are edge-triggered: a descriptor that stays readable is not
//! reported again until it has been read to `WouldBlock`. Callers must drain
//! every descriptor they are notified about.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, trace};

use crate::types::StreamDir;

/// One descriptor reported by [`Multiplexer::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// The token the descriptor was registered with.
    pub token: usize,
    pub readable: bool,
    pub error: bool,
    /// The other end of the pipe was closed.
    pub hangup: bool,
}

pub struct Multiplexer {
    poll: Poll,
    events: Events,
    capacity: usize,
}

impl std::fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multiplexer")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Multiplexer {
    pub fn new(capacity: usize) -> io::Result<Self> {
        let capacity = capacity.max(1);
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(capacity),
            capacity,
        })
    }

    /// Watch `fd` under `token`. Input streams are watched for writability,
    /// everything else for readability.
    ///
    /// Registering a descriptor twice is not an error.
    pub fn register(&mut self, fd: RawFd, token: usize, dir: StreamDir) -> io::Result<()> {
        let interest = match dir {
            StreamDir::In => Interest::WRITABLE,
            StreamDir::Out | StreamDir::Err => Interest::READABLE,
        };
        match self
            .poll
            .registry()
            .register(&mut SourceFd(&fd), Token(token), interest)
        {
            Ok(()) => {
                trace!(fd, token, "registered descriptor");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(fd, token, "descriptor already registered");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Stop watching `fd`.
    ///
    /// Descriptors that were never registered, or are no longer valid, are
    /// treated as already unregistered.
    pub fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        match self.poll.registry().deregister(&mut SourceFd(&fd)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) if e.raw_os_error() == Some(libc::EBADF) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Wait for at most `timeout` (`None` = indefinitely) and return up to
    /// `max_events` ready descriptors.
    ///
    /// A zero timeout returns immediately with whatever is ready. An
    /// interrupted wait (a signal arrived) returns an empty list.
    pub fn wait(&mut self, max_events: usize, timeout: Option<Duration>) -> io::Result<Vec<Readiness>> {
        let max_events = max_events.max(1);
        if max_events != self.capacity {
            self.events = Events::with_capacity(max_events);
            self.capacity = max_events;
        }

        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Vec::new()),
            Err(e) => return Err(e),
        }

        Ok(self
            .events
            .iter()
            .map(|ev| Readiness {
                token: ev.token().0,
                readable: ev.is_readable(),
                error: ev.is_error(),
                hangup: ev.is_read_closed(),
            })
            .collect())
    }
}
