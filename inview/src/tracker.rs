use alloc::rc::Rc;
use core::cell::Cell;

use crate::{
    DiagnosticEntry, DiagnosticSink, EventCallback, ObservationBackend, ObservationEvent,
    SubscriptionToken, TrackerConfig, TrackerError, TrackerState, TracingSink,
};

/// A read-only view of a tracker's `is_intersecting` state.
///
/// Cheap to clone. The value is live: it reflects the most recently applied observation.
#[derive(Clone, Debug)]
pub struct VisibilityHandle {
    state: Rc<Cell<bool>>,
}

impl VisibilityHandle {
    pub fn is_intersecting(&self) -> bool {
        self.state.get()
    }
}

struct ActiveWatch<T> {
    token: SubscriptionToken,
    target: T,
    config: TrackerConfig,
    /// Cleared on teardown; callbacks check it before touching state.
    live: Rc<Cell<bool>>,
}

/// Maintains a live "is this target within the configured proximity of its viewport" flag.
///
/// A tracker is one subscription slot: it owns at most one watch with its backend at a time.
/// Re-attaching with a different target or config tears the previous watch down first, and the
/// watch is released on every exit path (`attach`, `detach`, or drop).
///
/// This type is single-threaded and holds no UI objects. Events are applied from backend
/// callbacks with last-delivered-wins semantics; events from a torn-down watch are discarded even
/// if the backend delivers them late.
pub struct VisibilityTracker<B: ObservationBackend> {
    backend: B,
    sink: Rc<dyn DiagnosticSink>,
    state: Rc<Cell<bool>>,
    watch: Option<ActiveWatch<B::Target>>,
}

impl<B: ObservationBackend> VisibilityTracker<B> {
    /// Creates a detached tracker that records diagnostics with [`TracingSink`].
    pub fn new(backend: B) -> Self {
        Self::with_sink(backend, TracingSink)
    }

    pub fn with_sink(backend: B, sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            backend,
            sink: Rc::new(sink),
            state: Rc::new(Cell::new(false)),
            watch: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn handle(&self) -> VisibilityHandle {
        VisibilityHandle {
            state: Rc::clone(&self.state),
        }
    }

    pub fn is_intersecting(&self) -> bool {
        self.state.get()
    }

    pub fn is_attached(&self) -> bool {
        self.watch.is_some()
    }

    pub fn state(&self) -> TrackerState {
        TrackerState {
            is_intersecting: self.state.get(),
            attached: self.watch.is_some(),
        }
    }

    /// The config of the active watch, if any.
    pub fn config(&self) -> Option<&TrackerConfig> {
        self.watch.as_ref().map(|w| &w.config)
    }

    /// The target of the active watch, if any.
    pub fn target(&self) -> Option<&B::Target> {
        self.watch.as_ref().map(|w| &w.target)
    }

    /// Establishes a watch on `target` scoped to `config`.
    ///
    /// - `target = None` (e.g. not mounted yet) makes no backend call; any previous watch is still
    ///   torn down.
    /// - Re-attaching with the same target and an equal config keeps the existing watch.
    /// - The config is validated before anything else, so an invalid config leaves the current
    ///   watch in place.
    ///
    /// On [`TrackerError::BackendUnavailable`] the tracker stays detached and `is_intersecting`
    /// keeps its value (`false` for a fresh tracker).
    pub fn attach(
        &mut self,
        target: Option<B::Target>,
        config: TrackerConfig,
    ) -> Result<VisibilityHandle, TrackerError> {
        let options = match config.validate() {
            Ok(options) => options,
            Err(err) => {
                vwarn!(error = %err, "VisibilityTracker::attach: invalid config");
                return Err(err);
            }
        };

        if let (Some(watch), Some(next)) = (&self.watch, &target) {
            if watch.target == *next && watch.config == config {
                vtrace!(token = watch.token.0, "VisibilityTracker::attach: unchanged");
                return Ok(self.handle());
            }
        }

        self.detach();

        let Some(target) = target else {
            vtrace!("VisibilityTracker::attach: no target");
            return Ok(self.handle());
        };

        let live = Rc::new(Cell::new(true));
        let on_event = self.event_callback(Rc::clone(&live));
        let token = match self.backend.observe(&target, &options, on_event) {
            Ok(token) => token,
            Err(err) => {
                live.set(false);
                vwarn!(error = %err, "VisibilityTracker::attach: observe failed");
                return Err(err);
            }
        };

        vdebug!(
            token = token.0,
            threshold = options.threshold,
            root_margin = %options.root_margin,
            "VisibilityTracker::attach"
        );
        self.watch = Some(ActiveWatch {
            token,
            target,
            config,
            live,
        });
        Ok(self.handle())
    }

    /// Tears down the active watch, if any.
    ///
    /// Idempotent. After this returns, no event (including one already in flight) changes state.
    pub fn detach(&mut self) {
        let Some(watch) = self.watch.take() else {
            return;
        };
        watch.live.set(false);
        self.backend.unobserve(watch.token);
        vdebug!(token = watch.token.0, "VisibilityTracker::detach");
    }

    fn event_callback(&self, live: Rc<Cell<bool>>) -> EventCallback {
        let state = Rc::clone(&self.state);
        let sink = Rc::clone(&self.sink);
        Rc::new(move |event: ObservationEvent| {
            if !live.get() {
                vtrace!(
                    target_label = %event.target_label,
                    "VisibilityTracker: discarded event from torn-down watch"
                );
                return;
            }
            if let Err(err) = sink.record(&DiagnosticEntry::from(&event)) {
                vwarn!(error = %err, "VisibilityTracker: diagnostic sink failed");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
            }
            state.set(event.is_intersecting);
        })
    }
}

impl<B: ObservationBackend> Drop for VisibilityTracker<B> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<B> core::fmt::Debug for VisibilityTracker<B>
where
    B: ObservationBackend + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("backend", &self.backend)
            .field("is_intersecting", &self.state.get())
            .field("token", &self.watch.as_ref().map(|w| w.token))
            .finish()
    }
}
