// src/engine/actions.rs

//! Click handling.
//!
//! The renderer prints the token of a clicked region (`<sid>_<suffix>`) on
//! its stdout. Any renderer diagnostic that happens to look like a token of
//! a configured block is dispatched as a click too; the renderer's output
//! carries nothing else to tell the two apart.

use tracing::{info, warn};

use crate::model::Block;
use crate::process::command::spawn_detached;
use crate::process::lines::strip_line_ending;
use crate::types::ClickAction;

/// Shortest possible token: one sid character plus `_xxx`.
const MIN_TOKEN_LEN: usize = 5;
const SUFFIX_LEN: usize = 4;

/// A token resolved to a configured command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMatch<'a> {
    pub sid: &'a str,
    pub action: ClickAction,
    pub command: &'a str,
}

/// Split a line into `(sid, action)` if it has the shape of a token.
pub fn parse_action(line: &str) -> Option<(&str, ClickAction)> {
    let line = strip_line_ending(line);
    if line.len() < MIN_TOKEN_LEN {
        return None;
    }
    let split = line.len() - SUFFIX_LEN;
    if !line.is_char_boundary(split) {
        return None;
    }
    let (sid, tail) = line.split_at(split);
    let action = ClickAction::from_suffix(tail.strip_prefix('_')?)?;
    Some((sid, action))
}

/// Find the block and command a token refers to.
///
/// Returns `None` for lines that are not tokens, unknown sids, and actions
/// the block has no command for.
pub fn resolve_action<'a>(blocks: &'a [Block], line: &str) -> Option<ActionMatch<'a>> {
    let (sid, action) = parse_action(line)?;
    let block = blocks.iter().find(|b| b.sid() == sid)?;
    let command = block.click_command(action)?;
    Some(ActionMatch {
        sid: block.sid(),
        action,
        command,
    })
}

/// Run the command for a token, without waiting for it.
///
/// A command that fails to start is logged; the line still counts as
/// handled.
pub fn dispatch_action<'a>(blocks: &'a [Block], line: &str) -> Option<ActionMatch<'a>> {
    let found = resolve_action(blocks, line)?;
    match spawn_detached(found.command) {
        Ok(pid) => info!(
            block = found.sid,
            action = found.action.suffix(),
            pid,
            "dispatched click command"
        ),
        Err(e) => warn!(
            block = found.sid,
            action = found.action.suffix(),
            error = %e,
            "click command failed to start"
        ),
    }
    Some(found)
}
