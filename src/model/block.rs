// src/model/block.rs

use std::time::{Duration, Instant};

use crate::config::{BlockConfig, LayoutSlot};
use crate::process::ProcessHandle;
use crate::types::{Align, BlockKind, ClickAction};

/// Where a block is in its run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Idle,
    Running,
    /// The last run failed; the block is retried at `retry_at`.
    Dead,
}

/// One status segment of the bar.
#[derive(Debug)]
pub struct Block {
    sid: String,
    kind: BlockKind,
    align: Align,
    config: BlockConfig,
    reload: Option<Duration>,
    pub handle: ProcessHandle,
    result: Option<String>,
    last_run: Option<Instant>,
    retry_at: Option<Instant>,
    pending_input: Option<String>,
    state: BlockState,
}

impl Block {
    /// Build a block for a format-string slot.
    ///
    /// A configured `align` wins over the zone the slot was parsed into.
    pub fn new(slot: &LayoutSlot, config: BlockConfig) -> Self {
        let command = config.effective_command(&slot.sid).to_string();
        Self {
            sid: slot.sid.clone(),
            kind: config.kind(),
            align: config.align.unwrap_or(slot.align),
            reload: config.reload_interval(),
            handle: ProcessHandle::new(command),
            result: None,
            last_run: None,
            retry_at: None,
            pending_input: None,
            state: BlockState::Idle,
            config,
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    /// Positive reload interval, if any. A timed block without one is static.
    pub fn reload(&self) -> Option<Duration> {
        self.reload
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    pub fn click_command(&self, action: ClickAction) -> Option<&str> {
        self.config.click(action)
    }

    pub fn has_pending_input(&self) -> bool {
        self.pending_input.is_some()
    }

    pub fn pending_input(&self) -> Option<&str> {
        self.pending_input.as_deref()
    }

    /// Store a line delivered by the block's spark. An older, unconsumed
    /// line is replaced.
    pub fn set_pending_input(&mut self, line: impl Into<String>) {
        self.pending_input = Some(line.into());
    }

    /// Consume the pending input. Called once per run, whatever its outcome.
    pub fn take_pending_input(&mut self) -> Option<String> {
        self.pending_input.take()
    }

    /// Whether the spark line is handed to the command as its argument.
    pub fn consumes_input(&self) -> bool {
        self.config.effective_consume()
    }

    /// True while a failed block must not be retried on its timer yet.
    pub fn retry_blocked(&self, now: Instant) -> bool {
        matches!(self.retry_at, Some(at) if now < at)
    }

    pub fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    pub fn mark_running(&mut self) {
        self.state = BlockState::Running;
    }

    /// A run produced `line`.
    pub fn record_success(&mut self, line: String, now: Instant) {
        self.result = Some(line);
        self.last_run = Some(now);
        self.retry_at = None;
        self.state = BlockState::Idle;
    }

    /// A run failed. The previous result stays; the block is tried again
    /// after its reload interval, or after `retry_delay` if it has none.
    pub fn record_failure(&mut self, now: Instant, retry_delay: Duration) {
        let delay = self.reload.unwrap_or(retry_delay);
        self.retry_at = Some(
            now.checked_add(delay)
                .or_else(|| now.checked_add(retry_delay))
                .unwrap_or(now),
        );
        self.state = BlockState::Dead;
    }

    /// Output of a live block's spark. Counts as a run.
    pub fn set_live_result(&mut self, line: String, now: Instant) {
        self.result = Some(line);
        self.last_run = Some(now);
    }

    /// The reaper collected this block's child.
    pub fn child_reaped(&mut self) {
        self.handle.close();
        self.handle.mark_reaped();
        if self.state == BlockState::Running {
            self.state = BlockState::Dead;
        }
    }
}
