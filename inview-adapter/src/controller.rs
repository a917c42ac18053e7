use inview::{
    DiagnosticSink, ObservationBackend, TrackerConfig, TrackerError, VisibilityHandle,
    VisibilityTracker,
};

/// A framework-neutral controller that binds one `inview::VisibilityTracker` to a UI use site.
///
/// This type does not hold any UI objects. Adapters drive it from their lifecycle hooks:
/// - `on_mount` / `set_target` when the observed element appears or changes
/// - `set_config` when the use site's threshold or root margin changes
/// - `on_unmount` (or drop) when the use site goes away
///
/// Visibility tracking is best-effort. If the backend is unavailable the controller is marked
/// degraded, logs a warning once and reports `is_visible() == false` for the rest of its life.
/// Configuration errors are returned to the caller.
pub struct Controller<B: ObservationBackend> {
    tracker: VisibilityTracker<B>,
    config: TrackerConfig,
    target: Option<B::Target>,
    degraded: bool,
}

impl<B: ObservationBackend> Controller<B> {
    pub fn new(backend: B) -> Self {
        Self::from_tracker(VisibilityTracker::new(backend))
    }

    pub fn with_sink(backend: B, sink: impl DiagnosticSink + 'static) -> Self {
        Self::from_tracker(VisibilityTracker::with_sink(backend, sink))
    }

    pub fn from_tracker(tracker: VisibilityTracker<B>) -> Self {
        Self {
            tracker,
            config: TrackerConfig::default(),
            target: None,
            degraded: false,
        }
    }

    /// Sets the initial config. It is validated on the first `on_mount`/`set_target`.
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn tracker(&self) -> &VisibilityTracker<B> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut VisibilityTracker<B> {
        &mut self.tracker
    }

    pub fn handle(&self) -> VisibilityHandle {
        self.tracker.handle()
    }

    pub fn is_visible(&self) -> bool {
        self.tracker.is_intersecting()
    }

    /// Whether the backend was found unavailable. Degraded controllers never attach again.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn on_mount(&mut self, target: B::Target) -> Result<(), TrackerError> {
        self.set_target(Some(target))
    }

    /// Moves the watch to a new target (or drops it for `None`).
    pub fn set_target(&mut self, target: Option<B::Target>) -> Result<(), TrackerError> {
        self.target = target;
        self.sync()
    }

    /// Replaces the config and re-establishes the watch.
    ///
    /// An invalid config is rejected and the previous config and watch stay in place.
    pub fn set_config(&mut self, config: TrackerConfig) -> Result<(), TrackerError> {
        config.validate()?;
        self.config = config;
        self.sync()
    }

    pub fn on_unmount(&mut self) {
        self.target = None;
        self.tracker.detach();
    }

    fn sync(&mut self) -> Result<(), TrackerError> {
        if self.degraded {
            return Ok(());
        }
        match self.tracker.attach(self.target.clone(), self.config.clone()) {
            Ok(_) => Ok(()),
            Err(TrackerError::BackendUnavailable) => {
                vwarn!("Controller: observation backend unavailable; visibility stays false");
                self.degraded = true;
                Ok(())
            }
            Err(err) => {
                vdebug!(error = %err, "Controller: rejected config");
                Err(err)
            }
        }
    }
}
