use alloc::rc::Rc;

use crate::{ObservationEvent, ObserveOptions, TrackerError};

/// The callback a backend invokes for every recomputed intersection of a watched target.
pub type EventCallback = Rc<dyn Fn(ObservationEvent)>;

/// An opaque identifier for a watch registered with an [`ObservationBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionToken(pub u64);

/// A facility that computes intersection changes and delivers them asynchronously.
///
/// In a browser this is the platform `IntersectionObserver` (see `DomBackend` with
/// `feature = "web"`); elsewhere it is a simulation such as [`crate::ManualBackend`].
///
/// Contract:
/// - `observe` registers exactly one watch and returns without invoking `on_event`
///   synchronously; events are delivered later, from the backend's own event loop.
/// - `unobserve` releases the watch. Unknown or already released tokens are ignored.
/// - A backend may still deliver events that were in flight when `unobserve` was called;
///   consumers must discard them.
pub trait ObservationBackend {
    /// The handle to a layout region this backend can watch.
    type Target: Clone + PartialEq;

    fn observe(
        &mut self,
        target: &Self::Target,
        options: &ObserveOptions,
        on_event: EventCallback,
    ) -> Result<SubscriptionToken, TrackerError>;

    fn unobserve(&mut self, token: SubscriptionToken);
}

/// A backend for environments without any observation facility.
///
/// Every `observe` fails with [`TrackerError::BackendUnavailable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnavailableBackend;

impl ObservationBackend for UnavailableBackend {
    type Target = ();

    fn observe(
        &mut self,
        _target: &(),
        _options: &ObserveOptions,
        _on_event: EventCallback,
    ) -> Result<SubscriptionToken, TrackerError> {
        Err(TrackerError::BackendUnavailable)
    }

    fn unobserve(&mut self, _token: SubscriptionToken) {}
}
