use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{
    EventCallback, ObservationBackend, ObservationEvent, ObserveOptions, Rect, SubscriptionToken,
    TrackerError, compute_intersection,
};

/// Identifies a target registered with a [`ManualBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u32);

#[derive(Clone, Debug)]
struct TargetEntry {
    label: String,
    rect: Rect,
}

struct Watch {
    target: TargetId,
    options: ObserveOptions,
    on_event: EventCallback,
    last_intersecting: Option<bool>,
}

struct Pending {
    on_event: EventCallback,
    event: ObservationEvent,
}

struct Inner {
    available: bool,
    viewport: Rect,
    targets: BTreeMap<TargetId, TargetEntry>,
    watches: BTreeMap<SubscriptionToken, Watch>,
    pending: VecDeque<Pending>,
    next_target: u32,
    next_token: u64,
    observe_calls: usize,
    unobserve_calls: usize,
    peak_active: usize,
}

impl Inner {
    fn event_for(&self, target: TargetId, options: &ObserveOptions) -> Option<ObservationEvent> {
        let entry = self.targets.get(&target)?;
        let (is_intersecting, ratio) = compute_intersection(&self.viewport, &entry.rect, options);
        Some(ObservationEvent {
            is_intersecting,
            intersection_ratio: ratio,
            bounding_rect: entry.rect,
            target_label: entry.label.clone(),
        })
    }

    /// Queues an event for every watch whose intersecting state changed.
    fn recompute(&mut self, only: Option<TargetId>) {
        let tokens: Vec<SubscriptionToken> = self
            .watches
            .iter()
            .filter(|(_, w)| only.is_none_or(|t| t == w.target))
            .map(|(token, _)| *token)
            .collect();

        for token in tokens {
            let Some(watch) = self.watches.get(&token) else {
                continue;
            };
            let Some(event) = self.event_for(watch.target, &watch.options) else {
                continue;
            };
            if watch.last_intersecting == Some(event.is_intersecting) {
                continue;
            }
            let on_event = Rc::clone(&watch.on_event);
            if let Some(watch) = self.watches.get_mut(&token) {
                watch.last_intersecting = Some(event.is_intersecting);
            }
            self.pending.push_back(Pending { on_event, event });
        }
    }
}

/// A simulated observation backend driven by explicit layout updates.
///
/// This type holds no UI objects. The host (or a test) describes the layout:
/// - `set_viewport` / `scroll_by` move the root bounds
/// - `add_target` / `set_target_rect` / `remove_target` describe watched regions
///
/// Like a browser, delivery is asynchronous: `observe` and layout changes only queue events,
/// and `flush` delivers them. Queued events keep their callback, so events queued before an
/// `unobserve` are still delivered, which lets tests exercise stale-event handling.
///
/// Clones share the same simulated layout.
#[derive(Clone)]
pub struct ManualBackend {
    inner: Rc<RefCell<Inner>>,
}

impl ManualBackend {
    pub fn new(viewport: Rect) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                available: true,
                viewport,
                targets: BTreeMap::new(),
                watches: BTreeMap::new(),
                pending: VecDeque::new(),
                next_target: 0,
                next_token: 0,
                observe_calls: 0,
                unobserve_calls: 0,
                peak_active: 0,
            })),
        }
    }

    /// A backend that behaves like a non-browser environment: every `observe` fails.
    pub fn unavailable() -> Self {
        let b = Self::new(Rect::default());
        b.inner.borrow_mut().available = false;
        b
    }

    pub fn viewport(&self) -> Rect {
        self.inner.borrow().viewport
    }

    pub fn set_viewport(&self, viewport: Rect) {
        let mut inner = self.inner.borrow_mut();
        inner.viewport = viewport;
        inner.recompute(None);
    }

    /// Moves the viewport, as a scroll of the root would.
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.viewport = inner.viewport.translate(dx, dy);
        inner.recompute(None);
    }

    pub fn add_target(&self, label: impl Into<String>, rect: Rect) -> TargetId {
        let mut inner = self.inner.borrow_mut();
        let id = TargetId(inner.next_target);
        inner.next_target = inner.next_target.wrapping_add(1);
        inner.targets.insert(
            id,
            TargetEntry {
                label: label.into(),
                rect,
            },
        );
        id
    }

    /// Returns `false` if the target is unknown.
    pub fn set_target_rect(&self, target: TargetId, rect: Rect) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.targets.get_mut(&target) else {
            return false;
        };
        entry.rect = rect;
        inner.recompute(Some(target));
        true
    }

    /// Removes a target from the layout. Watches on it stay registered but go quiet.
    pub fn remove_target(&self, target: TargetId) -> bool {
        self.inner.borrow_mut().targets.remove(&target).is_some()
    }

    /// Queues an arbitrary event for every watch on `target`.
    ///
    /// Returns the number of events queued.
    pub fn inject(&self, target: TargetId, event: ObservationEvent) -> usize {
        let mut inner = self.inner.borrow_mut();
        let callbacks: Vec<EventCallback> = inner
            .watches
            .values_mut()
            .filter(|w| w.target == target)
            .map(|w| {
                w.last_intersecting = Some(event.is_intersecting);
                Rc::clone(&w.on_event)
            })
            .collect();
        let n = callbacks.len();
        for on_event in callbacks {
            inner.pending.push_back(Pending {
                on_event,
                event: event.clone(),
            });
        }
        n
    }

    /// Delivers all queued events in FIFO order and returns how many were delivered.
    ///
    /// Events queued by callbacks during the flush are delivered in the same call.
    pub fn flush(&self) -> usize {
        let mut delivered = 0usize;
        loop {
            // The borrow must end before the callback runs: callbacks may call back into us.
            let next = self.inner.borrow_mut().pending.pop_front();
            let Some(Pending { on_event, event }) = next else {
                break;
            };
            on_event(event);
            delivered += 1;
        }
        delivered
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn active_watches(&self) -> usize {
        self.inner.borrow().watches.len()
    }

    /// Returns the number of active watches on a target.
    pub fn watches_on(&self, target: TargetId) -> usize {
        self.inner
            .borrow()
            .watches
            .values()
            .filter(|w| w.target == target)
            .count()
    }

    /// The largest number of simultaneously active watches seen so far.
    pub fn peak_active_watches(&self) -> usize {
        self.inner.borrow().peak_active
    }

    pub fn observe_calls(&self) -> usize {
        self.inner.borrow().observe_calls
    }

    pub fn unobserve_calls(&self) -> usize {
        self.inner.borrow().unobserve_calls
    }
}

impl core::fmt::Debug for ManualBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualBackend")
            .field("available", &inner.available)
            .field("viewport", &inner.viewport)
            .field("targets", &inner.targets.len())
            .field("watches", &inner.watches.len())
            .field("pending", &inner.pending.len())
            .finish()
    }
}

impl ObservationBackend for ManualBackend {
    type Target = TargetId;

    fn observe(
        &mut self,
        target: &TargetId,
        options: &ObserveOptions,
        on_event: EventCallback,
    ) -> Result<SubscriptionToken, TrackerError> {
        let mut inner = self.inner.borrow_mut();
        inner.observe_calls += 1;
        if !inner.available {
            return Err(TrackerError::BackendUnavailable);
        }

        let token = SubscriptionToken(inner.next_token);
        inner.next_token = inner.next_token.wrapping_add(1);

        // Browsers always report the initial state of a new watch.
        let initial = inner.event_for(*target, options);
        let last_intersecting = initial.as_ref().map(|e| e.is_intersecting);
        if let Some(event) = initial {
            inner.pending.push_back(Pending {
                on_event: Rc::clone(&on_event),
                event,
            });
        }

        inner.watches.insert(
            token,
            Watch {
                target: *target,
                options: *options,
                on_event,
                last_intersecting,
            },
        );
        inner.peak_active = inner.peak_active.max(inner.watches.len());
        Ok(token)
    }

    fn unobserve(&mut self, token: SubscriptionToken) {
        let mut inner = self.inner.borrow_mut();
        inner.unobserve_calls += 1;
        inner.watches.remove(&token);
    }
}
