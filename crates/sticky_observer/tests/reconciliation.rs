//! Boundary notifications fed straight into the coordinator, bypassing the
//! polling watchers.

use anyhow::Result;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use sticky_html::Document;
use sticky_observer::{
    IntersectionEntry, NodeKey, Rect, STUCK_CLASS, SentinelPair, StickyHost as _, StickyObserver,
    StickyObserverOptions, StickyState, derive_stuck,
};

const FRAME: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

struct Fixture {
    doc: Document,
    observer: StickyObserver,
    subject: NodeKey,
    sentinels: SentinelPair,
    events: Rc<RefCell<Vec<bool>>>,
}

impl Fixture {
    fn new(options: StickyObserverOptions) -> Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut doc = Document::new();
        let body = doc.append_element(NodeKey::ROOT, "body")?;
        let section = doc.append_element(body, "section")?;
        let subject = doc.append_element(section, "h2")?;
        doc.add_class(subject, "sticky-header")?;

        let mut observer = StickyObserver::observe(&mut doc, ".sticky-header", options);
        let sentinels = observer
            .sentinels_of(subject)
            .ok_or_else(|| anyhow::anyhow!("subject was not observed"))?;
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        observer.on_sticky_change(move |change| sink.borrow_mut().push(change.stuck));
        Ok(Self {
            doc,
            observer,
            subject,
            sentinels,
            events,
        })
    }

    /// Top sentinel notification with the sentinel's top edge at `y`.
    fn header_at(&mut self, y: f64) -> usize {
        let entry = sentinel_entry(self.sentinels.top, y);
        self.observer.handle_header_entries(&mut self.doc, &[entry])
    }

    /// Bottom sentinel notification with the sentinel's top edge at `y`.
    fn footer_at(&mut self, y: f64) -> usize {
        let entry = sentinel_entry(self.sentinels.bottom, y);
        self.observer.handle_footer_entries(&mut self.doc, &[entry])
    }

    fn state(&self) -> Option<StickyState> {
        self.observer.state(self.subject)
    }

    fn events(&self) -> Vec<bool> {
        self.events.borrow().clone()
    }
}

fn sentinel_entry(target: NodeKey, y: f64) -> IntersectionEntry {
    IntersectionEntry::measure(target, Rect::new(0.0, y, 800.0, 10.0), Some(FRAME))
}

// Sentinel positions that drive each boundary flag.
const TOP_PAST: f64 = -20.0;
const TOP_IN_FLOW: f64 = 100.0;
const TOP_BELOW_FRAME: f64 = 900.0;
const BOTTOM_VISIBLE: f64 = 100.0;
const BOTTOM_LEAVING: f64 = -5.0;

#[test]
fn default_policy_sticks_and_unsticks_once_each() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    assert_eq!(fx.state(), Some(StickyState::default()));

    assert_eq!(fx.header_at(TOP_PAST), 1);
    assert!(fx.doc.has_class(fx.subject, STUCK_CLASS));
    assert_eq!(fx.header_at(TOP_IN_FLOW), 1);
    assert!(!fx.doc.has_class(fx.subject, STUCK_CLASS));
    assert_eq!(fx.events(), vec![true, false]);
    Ok(())
}

#[test]
fn settled_state_emits_nothing_more() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    fx.header_at(TOP_PAST);
    for _ in 0..5 {
        assert_eq!(fx.header_at(TOP_PAST), 0);
        assert_eq!(fx.footer_at(BOTTOM_VISIBLE), 0);
    }
    assert_eq!(fx.events(), vec![true]);
    Ok(())
}

#[test]
fn leaving_the_container_bottom_unsticks_by_default() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    fx.header_at(TOP_PAST);
    assert_eq!(fx.footer_at(BOTTOM_LEAVING), 1);
    assert_eq!(fx.footer_at(BOTTOM_VISIBLE), 1);
    assert_eq!(fx.events(), vec![true, false, true]);
    Ok(())
}

#[test]
fn remain_beyond_edge_only_unsticks_at_the_top() -> Result<()> {
    let options = StickyObserverOptions::new().with_remain_sticky_beyond_sticky_edge(true);
    let mut fx = Fixture::new(options)?;
    fx.header_at(TOP_PAST);
    assert_eq!(fx.footer_at(BOTTOM_LEAVING), 0);
    let state = fx.state().unwrap_or_default();
    assert!(state.is_stuck);
    assert!(!state.bottom_stuck);

    assert_eq!(fx.header_at(TOP_IN_FLOW), 1);
    assert_eq!(fx.events(), vec![true, false]);
    Ok(())
}

#[test]
fn sentinel_below_the_frame_is_hysteresis() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    assert_eq!(fx.header_at(TOP_BELOW_FRAME), 0);
    assert_eq!(fx.state(), Some(StickyState::default()));

    fx.header_at(TOP_PAST);
    let stuck = fx.state();
    assert_eq!(fx.header_at(TOP_BELOW_FRAME), 0);
    assert_eq!(fx.state(), stuck);
    assert_eq!(fx.events(), vec![true]);
    Ok(())
}

#[test]
fn unassociated_and_misrouted_entries_are_ignored() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    let stranger = sentinel_entry(NodeKey(4242), TOP_PAST);
    assert_eq!(fx.observer.handle_header_entries(&mut fx.doc, &[stranger]), 0);
    assert_eq!(fx.observer.handle_footer_entries(&mut fx.doc, &[stranger]), 0);

    // A bottom sentinel delivered through the header path.
    let misrouted = sentinel_entry(fx.sentinels.bottom, TOP_PAST);
    assert_eq!(fx.observer.handle_header_entries(&mut fx.doc, &[misrouted]), 0);

    assert_eq!(fx.state(), Some(StickyState::default()));
    assert!(fx.events().is_empty());
    Ok(())
}

#[test]
fn entries_without_frame_bounds_are_ignored() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    let mut entry = sentinel_entry(fx.sentinels.top, TOP_PAST);
    entry.root_bounds = None;
    assert_eq!(fx.observer.handle_header_entries(&mut fx.doc, &[entry]), 0);
    assert_eq!(fx.state(), Some(StickyState::default()));
    Ok(())
}

#[test]
fn disconnect_is_final_and_keeps_state() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    fx.header_at(TOP_PAST);
    fx.observer.disconnect();
    fx.observer.disconnect();
    assert!(!fx.observer.is_connected());

    assert_eq!(fx.header_at(TOP_IN_FLOW), 0);
    assert_eq!(fx.footer_at(BOTTOM_LEAVING), 0);
    assert_eq!(fx.observer.process(&mut fx.doc), 0);
    assert_eq!(fx.events(), vec![true]);
    assert!(fx.observer.is_stuck(fx.subject));
    assert!(fx.doc.contains(fx.sentinels.top));
    assert_eq!(fx.observer.subject_of(fx.sentinels.bottom), Some(fx.subject));
    Ok(())
}

#[test]
fn removed_listeners_are_not_called() -> Result<()> {
    let mut fx = Fixture::new(StickyObserverOptions::default())?;
    let extra = Rc::new(RefCell::new(0_u32));
    let sink = Rc::clone(&extra);
    let id = fx.observer.on_sticky_change(move |_| *sink.borrow_mut() += 1);
    fx.header_at(TOP_PAST);
    assert!(fx.observer.remove_event_listener(id));
    fx.header_at(TOP_IN_FLOW);
    assert_eq!(*extra.borrow(), 1);
    assert_eq!(fx.events(), vec![true, false]);
    Ok(())
}

proptest! {
    #[test]
    fn stuck_flag_is_always_derived(
        steps in prop::collection::vec((any::<bool>(), any::<bool>()), 0..48),
        remain in any::<bool>(),
    ) {
        let options = StickyObserverOptions::new().with_remain_sticky_beyond_sticky_edge(remain);
        let mut fx = Fixture::new(options).map_err(|err| TestCaseError::fail(err.to_string()))?;
        let mut expected_events = Vec::new();
        let mut previous = false;
        for (drive_top, value) in steps {
            match (drive_top, value) {
                (true, true) => fx.header_at(TOP_PAST),
                (true, false) => fx.header_at(TOP_IN_FLOW),
                (false, true) => fx.footer_at(BOTTOM_VISIBLE),
                (false, false) => fx.footer_at(BOTTOM_LEAVING),
            };
            let state = fx.state().unwrap_or_default();
            let derived = derive_stuck(state.top_stuck, state.bottom_stuck, remain);
            prop_assert_eq!(state.is_stuck, derived);
            if derived != previous {
                expected_events.push(derived);
                previous = derived;
            }
        }
        prop_assert_eq!(fx.events(), expected_events);
    }
}
