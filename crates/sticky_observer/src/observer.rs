//! The sticky coordinator.
//!
//! Each subject gets a top and a bottom sentinel inside its positioned
//! ancestor. The top sentinels are registered with a header watcher
//! (threshold 0), the bottom ones with a footer watcher (threshold 1). Each
//! notification updates one boundary flag of the owning subject, and a
//! `sticky-change` is dispatched only when the derived stuck flag flips.
//!
//! The observer never holds the host. Every operation that needs the
//! document takes it as an argument, and all state changes happen
//! synchronously inside that call.

use crate::config::StickyObserverOptions;
use crate::events::{EventListeners, ListenerId, STUCK_CLASS, StickyChange, StickyEventKind};
use crate::host::{NodeKey, Position, StickyHost};
use crate::sentinel::{SentinelRole, create_sentinel};
use crate::state::{StickyState, bottom_boundary_update, top_boundary_update};
use crate::watcher::{
    IntersectionEntry, VisibilityWatcher, WatcherFactory, WatcherOptions, polling_factory,
};
use anyhow::{Context as _, Result};
use core::fmt;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Attribute set on subjects in debug mode.
pub const DEBUG_SUBJECT_ATTRIBUTE: &str = "data-sticky-subject";

/// Top and bottom sentinel of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelPair {
    pub top: NodeKey,
    pub bottom: NodeKey,
}

/// Tracks stuck/unstuck transitions for every subject matched at setup.
pub struct StickyObserver {
    options: StickyObserverOptions,
    header: Box<dyn VisibilityWatcher>,
    footer: Box<dyn VisibilityWatcher>,
    /// Sentinel -> (subject, role). Keys are identifiers only; they never keep
    /// a subject alive.
    sentinels: HashMap<NodeKey, (NodeKey, SentinelRole)>,
    states: HashMap<NodeKey, StickyState>,
    pairs: HashMap<NodeKey, SentinelPair>,
    /// Subjects in setup order.
    order: Vec<NodeKey>,
    listeners: EventListeners,
    connected: bool,
}

impl StickyObserver {
    /// Observe every element matching `selector`, using polling watchers.
    ///
    /// Elements without a parent are skipped, and so is any subject whose
    /// setup fails in the host. Neither is reported as an error.
    pub fn observe<H: StickyHost>(
        host: &mut H,
        selector: &str,
        options: StickyObserverOptions,
    ) -> Self {
        Self::observe_with(host, selector, options, &polling_factory)
    }

    /// Like [`Self::observe`], with watchers built by `factory`.
    pub fn observe_with<H: StickyHost>(
        host: &mut H,
        selector: &str,
        options: StickyObserverOptions,
        factory: &WatcherFactory,
    ) -> Self {
        let mut observer = Self {
            options,
            header: factory(WatcherOptions::header(options.container)),
            footer: factory(WatcherOptions::footer(options.container)),
            sentinels: HashMap::new(),
            states: HashMap::new(),
            pairs: HashMap::new(),
            order: Vec::new(),
            listeners: EventListeners::new(),
            connected: true,
        };
        let targets = host.query_selector_all(selector);
        if targets.is_empty() && options.debug {
            info!("sticky observer: selector {selector:?} matched no elements");
        }
        for subject in targets {
            if let Err(err) = observer.observe_subject(host, subject) {
                warn!("sticky observer: skipping subject {subject}: {err:#}");
            }
        }
        observer
    }

    /// Start tracking one more subject.
    ///
    /// Returns `Ok(false)` without touching the document when the observer is
    /// disconnected, the subject is already tracked, or it has no parent.
    ///
    /// # Errors
    ///
    /// Propagates host failures while correcting the ancestor or inserting
    /// sentinels. Nothing is registered in that case.
    pub fn observe_subject<H: StickyHost>(
        &mut self,
        host: &mut H,
        subject: NodeKey,
    ) -> Result<bool> {
        if !self.connected || self.states.contains_key(&subject) {
            return Ok(false);
        }
        let Some(parent) = host.parent(subject) else {
            debug!("sticky observer: {subject} has no parent, not observed");
            return Ok(false);
        };

        // Sentinels are absolutely positioned against this ancestor.
        if host.computed_position(parent) == Position::Static {
            if self.options.debug {
                warn!(
                    "sticky observer: parent {parent} of sticky subject {subject} is statically \
                     positioned; setting 'position: relative' so sentinels anchor to it"
                );
            } else {
                debug!("sticky observer: forcing 'position: relative' on {parent}");
            }
            host.set_style(parent, "position", Position::Relative.as_str())
                .with_context(|| format!("correcting position of {parent}"))?;
        }

        let debug_mode = self.options.debug;
        let pair = SentinelPair {
            top: create_sentinel(host, SentinelRole::Top, debug_mode)?,
            bottom: create_sentinel(host, SentinelRole::Bottom, debug_mode)?,
        };
        host.prepend_child(parent, pair.top)
            .with_context(|| format!("inserting top sentinel into {parent}"))?;
        if let Err(err) = host.append_child(parent, pair.bottom) {
            if let Err(cleanup) = host.remove_node(pair.top) {
                debug!("sticky observer: could not remove orphaned top sentinel: {cleanup:#}");
            }
            return Err(err.context(format!("inserting bottom sentinel into {parent}")));
        }

        self.states.insert(subject, StickyState::default());
        self.sentinels.insert(pair.top, (subject, SentinelRole::Top));
        self.sentinels.insert(pair.bottom, (subject, SentinelRole::Bottom));
        self.pairs.insert(subject, pair);
        self.order.push(subject);

        self.header.observe(pair.top);
        self.footer.observe(pair.bottom);

        if debug_mode {
            decorate_subject(host, subject);
        }
        Ok(true)
    }

    /// Drain both watchers and handle their records, header first.
    ///
    /// Subjects that left the document are dropped before measuring.
    /// Returns the number of `sticky-change` notifications dispatched.
    pub fn process<H: StickyHost>(&mut self, host: &mut H) -> usize {
        if !self.connected {
            return 0;
        }
        self.prune_detached(host);
        let header_records = self.header.take_records(&*host);
        let mut fired = self.handle_header_entries(host, &header_records);
        let footer_records = self.footer.take_records(&*host);
        fired += self.handle_footer_entries(host, &footer_records);
        fired
    }

    /// Handle a batch of top-sentinel notifications.
    pub fn handle_header_entries<H: StickyHost>(
        &mut self,
        host: &mut H,
        entries: &[IntersectionEntry],
    ) -> usize {
        self.handle_entries(host, entries, SentinelRole::Top)
    }

    /// Handle a batch of bottom-sentinel notifications.
    pub fn handle_footer_entries<H: StickyHost>(
        &mut self,
        host: &mut H,
        entries: &[IntersectionEntry],
    ) -> usize {
        self.handle_entries(host, entries, SentinelRole::Bottom)
    }

    fn handle_entries<H: StickyHost>(
        &mut self,
        host: &mut H,
        entries: &[IntersectionEntry],
        role: SentinelRole,
    ) -> usize {
        if !self.connected {
            return 0;
        }
        let remain = self.options.remain_sticky_beyond_sticky_edge;
        let mut fired = 0;
        for entry in entries {
            let Some(&(subject, sentinel_role)) = self.sentinels.get(&entry.target) else {
                continue;
            };
            if sentinel_role != role {
                debug!("sticky observer: {role} batch carried a {sentinel_role} sentinel, ignored");
                continue;
            }
            let Some(state) = self.states.get_mut(&subject) else {
                continue;
            };
            if entry.root_bounds.is_none() {
                continue;
            }
            let update = match role {
                SentinelRole::Top => top_boundary_update(entry),
                SentinelRole::Bottom => bottom_boundary_update(entry),
            };
            match (role, update) {
                (SentinelRole::Top, Some(value)) => state.top_stuck = value,
                (SentinelRole::Bottom, Some(value)) => state.bottom_stuck = value,
                (_, None) => {}
            }
            if let Some(stuck) = state.reconcile(remain) {
                self.fire(host, subject, stuck);
                fired += 1;
            }
        }
        fired
    }

    fn fire<H: StickyHost>(&mut self, host: &mut H, subject: NodeKey, stuck: bool) {
        self.listeners.dispatch(&StickyChange {
            target: subject,
            stuck,
        });
        if let Err(err) = host.toggle_class(subject, STUCK_CLASS, stuck) {
            warn!("sticky observer: could not toggle '{STUCK_CLASS}' on {subject}: {err:#}");
        }
        if self.options.debug {
            info!(
                "sticky observer: {} {subject}",
                if stuck { "STUCK" } else { "UNSTUCK" }
            );
        }
    }

    /// Stop all future notifications. Sticky state, sentinels and
    /// associations are left in place. Idempotent.
    pub fn disconnect(&mut self) {
        self.header.disconnect();
        self.footer.disconnect();
        self.connected = false;
    }

    /// Stop tracking `subject`: its sentinels are unregistered and removed
    /// from the document, and its state is dropped. The positioning
    /// correction on its ancestor stays.
    ///
    /// Returns false when `subject` was not tracked.
    pub fn unobserve<H: StickyHost>(&mut self, host: &mut H, subject: NodeKey) -> bool {
        let Some(pair) = self.pairs.remove(&subject) else {
            return false;
        };
        self.states.remove(&subject);
        self.order.retain(|key| *key != subject);
        self.header.unobserve(pair.top);
        self.footer.unobserve(pair.bottom);
        for sentinel in [pair.top, pair.bottom] {
            self.sentinels.remove(&sentinel);
            if host.contains(sentinel)
                && let Err(err) = host.remove_node(sentinel)
            {
                debug!("sticky observer: could not remove sentinel {sentinel}: {err:#}");
            }
        }
        true
    }

    /// Forget subjects the page has removed.
    fn prune_detached<H: StickyHost>(&mut self, host: &mut H) {
        let detached: Vec<NodeKey> = self
            .order
            .iter()
            .copied()
            .filter(|subject| !host.contains(*subject))
            .collect();
        for subject in detached {
            debug!("sticky observer: {subject} left the document, releasing it");
            self.unobserve(host, subject);
        }
    }

    /// Register `listener` for `kind` notifications.
    pub fn add_event_listener<F>(&mut self, kind: StickyEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&StickyChange) + 'static,
    {
        self.listeners.add(kind, listener)
    }

    /// Remove a listener. Returns false when `id` is unknown.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Shorthand for a `sticky-change` listener.
    pub fn on_sticky_change<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StickyChange) + 'static,
    {
        self.add_event_listener(StickyEventKind::StickyChange, listener)
    }

    /// Current boundary flags of `subject`, if tracked.
    pub fn state(&self, subject: NodeKey) -> Option<StickyState> {
        self.states.get(&subject).copied()
    }

    /// Whether `subject` is tracked and currently stuck.
    pub fn is_stuck(&self, subject: NodeKey) -> bool {
        self.states.get(&subject).is_some_and(|state| state.is_stuck)
    }

    /// Tracked subjects in setup order.
    pub fn subjects(&self) -> &[NodeKey] {
        &self.order
    }

    /// Sentinels inserted for `subject`, if tracked.
    pub fn sentinels_of(&self, subject: NodeKey) -> Option<SentinelPair> {
        self.pairs.get(&subject).copied()
    }

    /// Subject owning `sentinel`, if it is one of ours.
    pub fn subject_of(&self, sentinel: NodeKey) -> Option<NodeKey> {
        self.sentinels.get(&sentinel).map(|&(subject, _)| subject)
    }

    /// Options this observer was built with.
    pub fn options(&self) -> &StickyObserverOptions {
        &self.options
    }

    /// False once [`Self::disconnect`] has been called.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Outline a debug-mode subject. Failures are logged; the subject stays tracked.
fn decorate_subject<H: StickyHost>(host: &mut H, subject: NodeKey) {
    if let Err(err) = host.set_style(subject, "outline", "3px dashed blue") {
        warn!("sticky observer: could not outline {subject}: {err:#}");
    }
    if let Err(err) = host.set_attribute(subject, DEBUG_SUBJECT_ATTRIBUTE, "true") {
        warn!("sticky observer: could not mark {subject}: {err:#}");
    }
}

impl fmt::Debug for StickyObserver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StickyObserver")
            .field("options", &self.options)
            .field("subjects", &self.order)
            .field("states", &self.states)
            .field("listeners", &self.listeners)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}
