// src/process/lines.rs

//! Reading lines from child output.
//!
//! Two shapes of reading happen in the scheduler:
//! - a block invocation produces exactly one line, read with a bounded
//!   buffer (optionally with a deadline);
//! - sparks and the renderer are drained: everything currently available on
//!   a non-blocking pipe is read, because the multiplexer is edge-triggered
//!   and will not report the descriptor again until it was emptied.

use std::io::{self, BufRead, Read};
use std::os::fd::RawFd;
use std::time::{Duration, Instant};

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};

use crate::process::handle::set_nonblocking;

const DRAIN_CHUNK: usize = 4096;

/// Strip one trailing `\n` (and a preceding `\r`).
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Read a single line of at most `limit` bytes.
///
/// Returns `Ok(None)` on immediate EOF. A line longer than `limit` is cut
/// at `limit` bytes. Invalid UTF-8 is replaced lossily.
pub fn read_line_bounded<R: BufRead>(reader: &mut R, limit: usize) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    let n = reader.take(limit as u64).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(&buf);
    Ok(Some(strip_line_ending(&text).to_string()))
}

/// Like [`read_line_bounded`], but gives up after `timeout`.
///
/// `fd` must be the descriptor underneath `reader`. It is switched to
/// non-blocking mode and waited on with a private `mio::Poll`. A timeout is
/// reported as `io::ErrorKind::TimedOut`.
pub fn read_line_with_timeout<R: BufRead>(
    reader: &mut R,
    fd: RawFd,
    limit: usize,
    timeout: Duration,
) -> io::Result<Option<String>> {
    set_nonblocking(fd)?;

    let mut poll = Poll::new()?;
    poll.registry()
        .register(&mut SourceFd(&fd), Token(0), Interest::READABLE)?;
    let mut events = Events::with_capacity(1);

    // A deadline past what `Instant` can represent means no deadline.
    let deadline = Instant::now().checked_add(timeout);
    let mut buf: Vec<u8> = Vec::new();

    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                let wait = match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Err(io::Error::new(
                                io::ErrorKind::TimedOut,
                                "no complete line before deadline",
                            ));
                        }
                        Some(deadline - now)
                    }
                    None => None,
                };
                match poll.poll(&mut events, wait) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        if available.is_empty() {
            // EOF
            if buf.is_empty() {
                return Ok(None);
            }
            break;
        }

        let room = limit.saturating_sub(buf.len());
        let window = &available[..available.len().min(room)];
        match window.iter().position(|&b| b == b'\n') {
            Some(i) => {
                buf.extend_from_slice(&window[..=i]);
                reader.consume(i + 1);
                break;
            }
            None => {
                let used = window.len();
                buf.extend_from_slice(window);
                reader.consume(used);
                if buf.len() >= limit {
                    break;
                }
            }
        }
    }

    let text = String::from_utf8_lossy(&buf);
    Ok(Some(strip_line_ending(&text).to_string()))
}

/// Result of draining a non-blocking stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Drained {
    /// Complete lines read, oldest first, without line endings.
    pub lines: Vec<String>,
    /// The writer closed its end.
    pub eof: bool,
}

impl Drained {
    /// The most recent line; earlier ones are stale.
    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

/// Read everything currently available from `reader`.
///
/// Stops on `WouldBlock` or EOF. Bytes after the last newline stay in
/// `carry` and are prepended to the next drain; on EOF they are flushed as a
/// final line. `carry` never holds more than `limit` bytes: a longer
/// unterminated run is emitted in `limit`-sized pieces, each counted as a
/// line.
pub fn drain_lines<R: Read>(
    reader: &mut R,
    carry: &mut Vec<u8>,
    limit: usize,
) -> io::Result<Drained> {
    let limit = limit.max(1);
    let mut drained = Drained::default();
    let mut chunk = [0u8; DRAIN_CHUNK];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => {
                drained.eof = true;
                break;
            }
            Ok(n) => {
                carry.extend_from_slice(&chunk[..n]);
                split_lines(carry, limit, &mut drained.lines);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => return Err(e),
        }
    }

    if drained.eof && !carry.is_empty() {
        drained.lines.push(decode_line(carry));
        carry.clear();
    }

    Ok(drained)
}

/// Move every complete line out of `carry`, then cut the remainder down to
/// at most `limit` bytes.
fn split_lines(carry: &mut Vec<u8>, limit: usize, lines: &mut Vec<String>) {
    let mut start = 0;
    loop {
        let rest = &carry[start..];
        match rest.iter().take(limit + 1).position(|&b| b == b'\n') {
            Some(pos) => {
                lines.push(decode_line(&rest[..pos]));
                start += pos + 1;
            }
            None if rest.len() > limit => {
                lines.push(decode_line(&rest[..limit]));
                start += limit;
            }
            None => break,
        }
    }
    carry.drain(..start);
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
