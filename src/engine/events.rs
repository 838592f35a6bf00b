// src/engine/events.rs

//! Bookkeeping for descriptors registered with the multiplexer.
//!
//! An event only *refers* to a stream. The stream belongs to its owner (the
//! bar or a spark), and only the owner ever closes it.

use std::os::fd::RawFd;

use crate::types::StreamDir;

/// Entity a registered stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOwner {
    Bar,
    /// Index into the scheduler's spark list.
    Spark(usize),
    /// The signal self-pipe.
    Signals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub owner: EventOwner,
    pub dir: StreamDir,
    pub fd: RawFd,
    pub registered: bool,
    /// Readiness was reported and the stream has not been drained yet.
    pub dirty: bool,
}

/// All events; an event's index is its multiplexer token.
#[derive(Debug, Default)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an (unregistered) event and return its token.
    pub fn push(&mut self, owner: EventOwner, dir: StreamDir, fd: RawFd) -> usize {
        self.events.push(Event {
            owner,
            dir,
            fd,
            registered: false,
            dirty: false,
        });
        self.events.len() - 1
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, token: usize) -> Option<&Event> {
        self.events.get(token)
    }

    pub fn get_mut(&mut self, token: usize) -> Option<&mut Event> {
        self.events.get_mut(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Flag the event behind `token`. Unknown tokens and unregistered
    /// events are ignored.
    pub fn mark_dirty(&mut self, token: usize) -> bool {
        match self.events.get_mut(token) {
            Some(ev) if ev.registered => {
                ev.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Tokens of dirty events matching `filter`, clearing their flag.
    pub fn take_dirty(&mut self, filter: impl Fn(EventOwner) -> bool) -> Vec<usize> {
        self.events
            .iter_mut()
            .enumerate()
            .filter(|(_, ev)| ev.dirty && filter(ev.owner))
            .map(|(token, ev)| {
                ev.dirty = false;
                token
            })
            .collect()
    }
}
