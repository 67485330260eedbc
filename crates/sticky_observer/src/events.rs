//! The `sticky-change` notification and its listener registry.

use crate::host::NodeKey;
use anyhow::{Error, anyhow};
use core::fmt;
use core::str::FromStr;

/// Class toggled on a subject to mirror its stuck state.
pub const STUCK_CLASS: &str = "is-stuck";

/// Payload of a `sticky-change` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickyChange {
    /// The subject element.
    pub target: NodeKey,
    pub stuck: bool,
}

/// Notification kinds a [`crate::StickyObserver`] dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickyEventKind {
    StickyChange,
}

impl StickyEventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StickyChange => "sticky-change",
        }
    }
}

impl fmt::Display for StickyEventKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for StickyEventKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "sticky-change" => Ok(Self::StickyChange),
            other => Err(anyhow!("unknown sticky event kind: {other}")),
        }
    }
}

/// Handle returned by [`EventListeners::add`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StickyChange)>;

/// Listener registry. Dispatch runs listeners in registration order.
#[derive(Default)]
pub struct EventListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, StickyEventKind, Listener)>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, kind: StickyEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&StickyChange) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&mut self, change: &StickyChange) {
        for (_, kind, listener) in &mut self.listeners {
            if *kind == StickyEventKind::StickyChange {
                listener(change);
            }
        }
    }
}

impl fmt::Debug for EventListeners {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EventListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
