use alloc::string::String;

/// Errors surfaced synchronously by [`crate::VisibilityTracker::attach`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TrackerError {
    /// The execution environment has no intersection observation facility.
    #[error("no intersection observation backend is available in this environment")]
    BackendUnavailable,

    #[error("threshold must be a fraction in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("invalid root margin {input:?}: {reason}")]
    InvalidRootMargin { input: String, reason: &'static str },
}

impl TrackerError {
    /// Returns `true` for the configuration errors (threshold or root margin).
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidThreshold(_) | Self::InvalidRootMargin { .. }
        )
    }
}

/// A failure reported by a [`crate::DiagnosticSink`].
///
/// The tracker logs and discards these; they never reach the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("diagnostic sink failed: {0}")]
pub struct SinkError(pub String);
