// src/engine/core.rs

//! Pure scheduling decisions.
//!
//! Nothing in here spawns, reads or waits: given the blocks and a point in
//! time, decide which blocks are due and how long the loop may sleep. The
//! IO shell in [`super::runtime`] acts on the answers.

use std::time::{Duration, Instant};

use crate::model::Block;
use crate::types::BlockKind;

/// A timed block is due once `elapsed >= reload - tolerance`.
pub fn reload_elapsed(elapsed: Duration, reload: Duration, tolerance: Duration) -> bool {
    elapsed >= reload.saturating_sub(tolerance)
}

/// Whether `block` must run in the tick happening at `now`.
///
/// Pending spark input always makes a block due. The "never ran" and
/// reload conditions are held back while a failed block waits for its
/// retry time. Live blocks are never run.
pub fn is_due(block: &Block, now: Instant, tolerance: Duration) -> bool {
    let retry_blocked = block.retry_blocked(now);
    match block.kind() {
        BlockKind::Once => block.last_run().is_none() && !retry_blocked,
        BlockKind::Timed => {
            if block.has_pending_input() {
                return true;
            }
            if retry_blocked {
                return false;
            }
            match (block.last_run(), block.reload()) {
                (None, _) => true,
                (Some(last), Some(reload)) => {
                    reload_elapsed(now.saturating_duration_since(last), reload, tolerance)
                }
                (Some(_), None) => false,
            }
        }
        BlockKind::Sparked => block.has_pending_input(),
        BlockKind::Live => false,
    }
}

/// Indices of all due blocks, in display order.
pub fn due_blocks(blocks: &[Block], now: Instant, tolerance: Duration) -> Vec<usize> {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| is_due(b, now, tolerance))
        .map(|(idx, _)| idx)
        .collect()
}

/// How long the loop may wait before some block needs attention.
///
/// `None` means no block is on a timer and the loop can wait until a
/// stream becomes readable.
pub fn next_wakeup(blocks: &[Block], now: Instant) -> Option<Duration> {
    blocks.iter().filter_map(|b| time_until_due(b, now)).min()
}

fn time_until_due(block: &Block, now: Instant) -> Option<Duration> {
    if block.has_pending_input() {
        return None;
    }

    let timer = match block.kind() {
        BlockKind::Once => block.last_run().is_none().then_some(Duration::ZERO),
        BlockKind::Timed => match (block.last_run(), block.reload()) {
            (None, _) => Some(Duration::ZERO),
            (Some(last), Some(reload)) => {
                Some(reload.saturating_sub(now.saturating_duration_since(last)))
            }
            (Some(_), None) => None,
        },
        BlockKind::Sparked | BlockKind::Live => None,
    }?;

    match block.retry_at() {
        Some(at) if now < at => Some(timer.max(at - now)),
        _ => Some(timer),
    }
}
