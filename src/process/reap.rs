// src/process/reap.rs

use std::io;

/// A child collected by [`reap_children`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaped {
    pub pid: u32,
    /// Exit code, if the child exited normally.
    pub code: Option<i32>,
    /// Terminating signal, if the child was killed.
    pub signal: Option<i32>,
}

/// Collect every terminated child without blocking.
///
/// Meant to be called from the main loop after SIGCHLD was observed, never
/// from the signal handler itself.
pub fn reap_children() -> Vec<Reaped> {
    let mut reaped = Vec::new();
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: `status` is a valid out-pointer for the duration of the call.
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };
        if pid > 0 {
            reaped.push(Reaped {
                pid: pid as u32,
                code: libc::WIFEXITED(status).then(|| libc::WEXITSTATUS(status)),
                signal: libc::WIFSIGNALED(status).then(|| libc::WTERMSIG(status)),
            });
            continue;
        }
        if pid == -1 && io::Error::last_os_error().kind() == io::ErrorKind::Interrupted {
            continue;
        }
        // 0: children exist but none exited; -1/ECHILD: no children left.
        break;
    }
    reaped
}
