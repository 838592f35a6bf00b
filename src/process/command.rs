// src/process/command.rs

//! Turning configured command strings into argv, without a shell.

use std::process::{Command, Stdio};

use crate::errors::SpawnError;

/// Split a command string into argv tokens with POSIX shell quoting rules.
///
/// A token starting with `~/` is expanded against `$HOME`. No variable
/// expansion, globbing or pipes: the result is handed to `execvp` as-is.
pub fn split_command(cmd: &str) -> Result<Vec<String>, SpawnError> {
    let tokens = shell_words::split(cmd)
        .map_err(|e| SpawnError::InvalidCommand(format!("{e} in {cmd:?}")))?;
    Ok(tokens.into_iter().map(expand_home).collect())
}

fn expand_home(token: String) -> String {
    match token.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) if !home.is_empty() => format!("{}/{rest}", home.trim_end_matches('/')),
            _ => token,
        },
        None => token,
    }
}

/// Build a `Command` from a command string plus extra argv entries.
///
/// Extra arguments are appended verbatim as distinct tokens; they are never
/// re-split.
pub fn build_command<I, S>(cmd: &str, extra: I) -> Result<Command, SpawnError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens = split_command(cmd)?;
    let (program, args) = tokens.split_first().ok_or(SpawnError::EmptyCommand)?;

    let mut command = Command::new(program);
    command.args(args);
    for arg in extra {
        command.arg(arg.as_ref());
    }
    Ok(command)
}

/// Start a command with all standard streams detached and forget about it.
///
/// The child is not waited for here; the scheduler's reaper collects it.
/// Returns the child's pid.
pub fn spawn_detached(cmd: &str) -> Result<u32, SpawnError> {
    let mut command = build_command(cmd, std::iter::empty::<&str>())?;
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(child.id())
}
