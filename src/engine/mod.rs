// src/engine/mod.rs

//! Scheduling engine for lemonfeed.
//!
//! This module ties together:
//! - the due/wakeup decisions ([`core`], pure, no IO)
//! - multiplexer event bookkeeping ([`events`])
//! - click dispatch for tokens echoed by the renderer ([`actions`])
//! - how a single block invocation is run ([`runner`])
//! - the tick loop that owns every process ([`runtime`])

pub mod actions;
pub mod core;
pub mod events;
pub mod runner;
pub mod runtime;

pub use actions::{dispatch_action, parse_action, resolve_action, ActionMatch};
pub use events::{Event, EventOwner, EventTable};
pub use runner::{BlockRunner, ProcessRunner};
pub use runtime::{Scheduler, SchedulerOptions, TickReport};
