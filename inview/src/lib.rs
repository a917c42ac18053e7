//! A headless visibility tracker.
//!
//! For UI-layer utilities (lifecycle controller, sorting, payload validation), see the
//! `inview-adapter` crate.
//!
//! This crate answers one question for a UI: "is this target currently within the configured
//! proximity of its viewport?" A [`VisibilityTracker`] owns a single watch with an
//! [`ObservationBackend`], applies every delivered [`ObservationEvent`] with last-delivered-wins
//! semantics, records a diagnostic entry per event, and guarantees that a torn-down watch can
//! never update state again.
//!
//! It is UI-agnostic. A host is expected to provide a backend:
//! - `DomBackend` on the platform `IntersectionObserver` (`feature = "web"`)
//! - [`ManualBackend`], a simulated layout for tests, TUIs and native shells
//!
//! ```
//! use inview::{ManualBackend, Rect, TrackerConfig, VisibilityTracker};
//!
//! let backend = ManualBackend::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let card = backend.add_target("anime-card", Rect::new(0.0, 700.0, 200.0, 300.0));
//!
//! let mut tracker = VisibilityTracker::new(backend.clone());
//! let handle = tracker.attach(Some(card), TrackerConfig::default()).unwrap();
//! backend.flush();
//! // 100px below the fold, inside the default 200px root margin.
//! assert!(handle.is_intersecting());
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod backend;
mod error;
mod manual;
mod margin;
mod options;
mod sink;
mod state;
mod tracker;
mod types;
#[cfg(feature = "web")]
mod web;

#[cfg(test)]
mod tests;

pub use backend::{EventCallback, ObservationBackend, SubscriptionToken, UnavailableBackend};
pub use error::{SinkError, TrackerError};
pub use manual::{ManualBackend, TargetId};
pub use margin::{MarginLength, RootMargin};
pub use options::{DEFAULT_ROOT_MARGIN, ObserveOptions, TrackerConfig};
pub use sink::{DiagnosticEntry, DiagnosticSink, NoopSink, RecordingSink, TracingSink};
pub use state::TrackerState;
pub use tracker::{VisibilityHandle, VisibilityTracker};
pub use types::{ObservationEvent, Rect, compute_intersection, meets_threshold};
#[cfg(feature = "web")]
pub use web::DomBackend;
