use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{ObservationEvent, Rect, SinkError};

/// A diagnostic record of one applied observation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticEntry {
    pub target_label: String,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
    pub bounding_rect: Rect,
}

impl From<&ObservationEvent> for DiagnosticEntry {
    fn from(event: &ObservationEvent) -> Self {
        Self {
            target_label: event.target_label.clone(),
            is_intersecting: event.is_intersecting,
            intersection_ratio: event.intersection_ratio,
            bounding_rect: event.bounding_rect,
        }
    }
}

/// Receives a [`DiagnosticEntry`] for every observation a tracker applies.
///
/// Recording is a side effect only. Errors are logged by the tracker and dropped; they never
/// change tracker state or reach the caller.
pub trait DiagnosticSink {
    fn record(&self, entry: &DiagnosticEntry) -> Result<(), SinkError>;
}

impl<F> DiagnosticSink for F
where
    F: Fn(&DiagnosticEntry) -> Result<(), SinkError>,
{
    fn record(&self, entry: &DiagnosticEntry) -> Result<(), SinkError> {
        self(entry)
    }
}

/// The default sink: logs each entry at `INFO` under the `inview::diagnostics` target.
///
/// Without `feature = "tracing"` this sink does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, entry: &DiagnosticEntry) -> Result<(), SinkError> {
        #[cfg(feature = "tracing")]
        tracing::info!(
            target: "inview::diagnostics",
            target_label = %entry.target_label,
            is_intersecting = entry.is_intersecting,
            ratio = entry.intersection_ratio,
            x = entry.bounding_rect.x,
            y = entry.bounding_rect.y,
            width = entry.bounding_rect.width,
            height = entry.bounding_rect.height,
            "intersection observed"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = entry;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _entry: &DiagnosticEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

/// An in-memory sink. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    entries: Rc<RefCell<Vec<DiagnosticEntry>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, entry: &DiagnosticEntry) -> Result<(), SinkError> {
        self.entries.borrow_mut().push(entry.clone());
        Ok(())
    }
}
