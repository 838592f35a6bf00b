// src/engine/runtime.rs

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::config::{ConfigFile, LayoutSlot, SchedulerSection};
use crate::errors::{LemonfeedError, Result};
use crate::model::{build_blocks, build_sparks, Bar, Block, Spark, SparkFeed};
use crate::mux::Multiplexer;
use crate::process::reap_children;
use crate::signals::SignalFlags;
use crate::types::StreamDir;

use super::actions::dispatch_action;
use super::core;
use super::events::{Event, EventOwner, EventTable};
use super::runner::{BlockRunner, ProcessRunner};

/// Timing knobs of the tick loop.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    pub tolerance: Duration,
    pub retry_delay: Duration,
    /// Longest line kept from a spark or the renderer, in bytes.
    pub line_limit: usize,
}

impl From<&SchedulerSection> for SchedulerOptions {
    fn from(section: &SchedulerSection) -> Self {
        Self {
            tolerance: section.tolerance_duration(),
            retry_delay: section.retry_delay_duration(),
            line_limit: section.line_limit,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Blocks that ran and produced a line.
    pub ran: Vec<String>,
    /// Blocks whose run failed.
    pub failed: Vec<String>,
    /// Live blocks updated from their spark.
    pub updated: Vec<String>,
    /// Renderer lines dispatched as click actions.
    pub actions: Vec<String>,
    /// A new bar line was written.
    pub rendered: bool,
}

/// The tick loop: owns the renderer, all blocks and sparks.
pub struct Scheduler<R: BlockRunner = ProcessRunner> {
    bar: Bar,
    blocks: Vec<Block>,
    sparks: Vec<Spark>,
    events: EventTable,
    mux: Multiplexer,
    signals: SignalFlags,
    runner: R,
    options: SchedulerOptions,
    next_wait: Option<Duration>,
    last_rendered: Option<String>,
}

impl<R: BlockRunner> fmt::Debug for Scheduler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("blocks", &self.blocks.len())
            .field("sparks", &self.sparks.len())
            .field("events", &self.events.len())
            .field("next_wait", &self.next_wait)
            .finish_non_exhaustive()
    }
}

impl<R: BlockRunner> Scheduler<R> {
    /// Build every entity from the config, start the renderer and the
    /// sparks, and register their streams.
    ///
    /// Failing to start the renderer is fatal. A spark that fails to start
    /// is logged and its block simply never gets input.
    pub fn from_config(
        cfg: &ConfigFile,
        layout: Vec<LayoutSlot>,
        runner: R,
        signals: SignalFlags,
    ) -> Result<Self> {
        let blocks = build_blocks(cfg, &layout);
        let mut sparks = build_sparks(&blocks);
        let mut bar = Bar::from_config(cfg, layout);

        bar.open().map_err(|e| {
            LemonfeedError::RendererGone(format!(
                "could not start '{}': {e}",
                bar.handle.command()
            ))
        })?;

        for spark in sparks.iter_mut() {
            let sid = blocks[spark.target()].sid();
            match spark.open() {
                Ok(pid) => debug!(block = sid, pid, "spark started"),
                Err(e) => warn!(block = sid, error = %e, "spark failed to start"),
            }
        }

        Self::new(bar, blocks, sparks, runner, SchedulerOptions::from(&cfg.config), signals)
    }

    /// Wire already constructed entities into a scheduler.
    ///
    /// Streams that are open at this point (renderer stdout, spark stdout,
    /// the signal self-pipe) are registered with the multiplexer.
    pub fn new(
        bar: Bar,
        blocks: Vec<Block>,
        sparks: Vec<Spark>,
        runner: R,
        options: SchedulerOptions,
        signals: SignalFlags,
    ) -> Result<Self> {
        let mut events = EventTable::new();
        if let Some(fd) = bar.handle.raw_fd(StreamDir::Out) {
            events.push(EventOwner::Bar, StreamDir::Out, fd);
        }
        for (idx, spark) in sparks.iter().enumerate() {
            if let Some(fd) = spark.handle.raw_fd(StreamDir::Out) {
                events.push(EventOwner::Spark(idx), StreamDir::Out, fd);
            }
        }
        if let Some(fd) = signals.wake_fd() {
            events.push(EventOwner::Signals, StreamDir::Out, fd);
        }

        let mut mux = Multiplexer::new(events.len())
            .map_err(|e| LemonfeedError::Multiplexer(format!("creating poller: {e}")))?;

        for token in 0..events.len() {
            let Some(ev) = events.get_mut(token) else {
                continue;
            };
            match mux.register(ev.fd, token, ev.dir) {
                Ok(()) => ev.registered = true,
                Err(e) => warn!(owner = ?ev.owner, fd = ev.fd, error = %e, "could not register stream"),
            }
        }

        Ok(Self {
            bar,
            blocks,
            sparks,
            events,
            mux,
            signals,
            runner,
            options,
            next_wait: Some(Duration::ZERO),
            last_rendered: None,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn bar(&self) -> &Bar {
        &self.bar
    }

    pub fn signals(&self) -> &SignalFlags {
        &self.signals
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Timeout the next tick will wait for. `None` waits indefinitely.
    pub fn next_wait(&self) -> Option<Duration> {
        self.next_wait
    }

    /// Override the next tick's wait (tests drive time this way).
    pub fn set_next_wait(&mut self, wait: Option<Duration>) {
        self.next_wait = wait;
    }

    /// The last line written to the renderer.
    pub fn last_rendered(&self) -> Option<&str> {
        self.last_rendered.as_deref()
    }

    /// Tick until shutdown is requested or a fatal error occurs, then tear
    /// everything down.
    pub fn run(&mut self) -> Result<()> {
        info!(
            blocks = self.blocks.len(),
            sparks = self.sparks.len(),
            "scheduler started"
        );

        let outcome = loop {
            if self.signals.shutdown_requested() {
                info!("shutdown requested");
                break Ok(());
            }
            if let Err(err) = self.tick() {
                break Err(err);
            }
        };

        self.shutdown();
        outcome
    }

    /// One iteration of the loop.
    pub fn tick(&mut self) -> Result<TickReport> {
        let mut report = TickReport::default();

        if self.signals.take_child_exited() {
            self.reap()?;
        }

        let ready = self
            .mux
            .wait(self.events.len(), self.next_wait)
            .map_err(|e| LemonfeedError::Multiplexer(e.to_string()))?;
        for readiness in &ready {
            self.events.mark_dirty(readiness.token);
        }
        if !self.events.take_dirty(|o| o == EventOwner::Signals).is_empty() {
            self.signals.drain_wakeups();
        }

        self.drain_sparks(&mut report);
        self.drain_bar(&mut report)?;
        self.run_due_blocks(&mut report);

        self.next_wait = core::next_wakeup(&self.blocks, Instant::now());
        trace!(next_wait = ?self.next_wait, "next wakeup");

        if !report.ran.is_empty() || !report.updated.is_empty() {
            self.render()?;
            report.rendered = true;
        }

        Ok(report)
    }

    /// Collect exited children and release the handles that owned them.
    ///
    /// The whole batch is accounted for before a renderer exit is reported.
    fn reap(&mut self) -> Result<()> {
        let mut renderer_gone = None;
        for child in reap_children() {
            if child.pid == self.bar.handle.pid() {
                self.bar.handle.mark_reaped();
                renderer_gone = Some(LemonfeedError::RendererGone(format!(
                    "renderer exited (pid {}, code {:?}, signal {:?})",
                    child.pid, child.code, child.signal
                )));
                continue;
            }
            if let Some(block) = self.blocks.iter_mut().find(|b| b.handle.pid() == child.pid) {
                trace!(block = block.sid(), pid = child.pid, code = ?child.code, "reaped block");
                block.child_reaped();
                continue;
            }
            if let Some(spark) = self.sparks.iter_mut().find(|s| s.handle.pid() == child.pid) {
                if spark.is_alive() {
                    warn!(pid = child.pid, code = ?child.code, "spark exited");
                }
                spark.handle.mark_reaped();
                continue;
            }
            trace!(pid = child.pid, code = ?child.code, "reaped click command");
        }
        match renderer_gone {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn drain_sparks(&mut self, report: &mut TickReport) {
        let now = Instant::now();
        for token in self.events.take_dirty(|o| matches!(o, EventOwner::Spark(_))) {
            let Some(&Event {
                owner: EventOwner::Spark(idx),
                fd,
                ..
            }) = self.events.get(token)
            else {
                continue;
            };
            let spark = &mut self.sparks[idx];
            let target = spark.target();

            let drained = match spark.drain(self.options.line_limit) {
                Ok(drained) => drained,
                Err(e) => {
                    warn!(block = self.blocks[target].sid(), error = %e, "reading spark failed");
                    continue;
                }
            };

            let block = &mut self.blocks[target];
            if let Some(line) = drained.last_line() {
                if drained.lines.len() > 1 {
                    trace!(block = block.sid(), skipped = drained.lines.len() - 1, "stale spark lines dropped");
                }
                match spark.feed() {
                    SparkFeed::Input => block.set_pending_input(line),
                    SparkFeed::Output => {
                        block.set_live_result(line.to_string(), now);
                        report.updated.push(block.sid().to_string());
                    }
                }
            }

            if drained.eof {
                warn!(block = block.sid(), "spark closed its output");
                if let Err(e) = self.mux.unregister(fd) {
                    debug!(fd, error = %e, "unregistering spark stream failed");
                }
                if let Some(ev) = self.events.get_mut(token) {
                    ev.registered = false;
                }
                spark.close();
            }
        }
    }

    fn drain_bar(&mut self, report: &mut TickReport) -> Result<()> {
        if self.events.take_dirty(|o| o == EventOwner::Bar).is_empty() {
            return Ok(());
        }

        let drained = self
            .bar
            .drain_output(self.options.line_limit)
            .map_err(|e| LemonfeedError::RendererGone(format!("reading renderer output: {e}")))?;

        for line in &drained.lines {
            match dispatch_action(&self.blocks, line) {
                Some(_) => report.actions.push(line.clone()),
                None => debug!(target: "lemonfeed::renderer", "{line}"),
            }
        }

        if drained.eof {
            return Err(LemonfeedError::RendererGone(
                "renderer closed its output".to_string(),
            ));
        }
        Ok(())
    }

    fn run_due_blocks(&mut self, report: &mut TickReport) {
        let now = Instant::now();
        for idx in core::due_blocks(&self.blocks, now, self.options.tolerance) {
            let block = &mut self.blocks[idx];
            let input = block.take_pending_input();
            let argument = if block.consumes_input() { input } else { None };

            block.mark_running();
            match self.runner.run_block(block, argument) {
                Ok(line) => {
                    debug!(block = block.sid(), result = %line, "block updated");
                    block.record_success(line, now);
                    report.ran.push(block.sid().to_string());
                }
                Err(e) => {
                    warn!(block = block.sid(), error = %e, "block run failed");
                    block.record_failure(now, self.options.retry_delay);
                    report.failed.push(block.sid().to_string());
                }
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let text = crate::render::bar_text(&self.blocks, self.bar.defaults());
        self.bar
            .write(&text)
            .map_err(|e| LemonfeedError::RendererGone(format!("writing bar text: {e}")))?;
        trace!(bytes = text.len(), "bar text written");
        self.last_rendered = Some(text);
        Ok(())
    }

    /// Stop sparks, then blocks, then the renderer, and collect what exited.
    pub fn shutdown(&mut self) {
        for token in 0..self.events.len() {
            if let Some(ev) = self.events.get_mut(token) {
                if ev.registered {
                    let _ = self.mux.unregister(ev.fd);
                    ev.registered = false;
                }
            }
        }
        for spark in self.sparks.iter_mut() {
            spark.close();
        }
        for block in self.blocks.iter_mut() {
            block.handle.terminate(libc::SIGTERM);
            block.handle.close();
        }
        self.bar.close();

        let reaped = reap_children();
        info!(reaped = reaped.len(), "scheduler stopped");
    }
}
