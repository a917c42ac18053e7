use alloc::string::String;

use crate::{RootMargin, TrackerError};

/// The root margin used by [`TrackerConfig::default`].
///
/// Reports targets as visible while they are still up to 200px outside the viewport.
pub const DEFAULT_ROOT_MARGIN: &str = "200px";

/// Configuration for a watch established by [`crate::VisibilityTracker::attach`].
///
/// The values are validated by `attach`, not here, so a config can be built from untrusted input
/// and rejected at integration time with a [`TrackerError`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TrackerConfig {
    /// Minimum visible-area ratio that counts as intersecting, in `[0, 1]`.
    pub threshold: f64,
    /// CSS margin shorthand applied to the root bounds (e.g. `"200px"`, `"10px 5%"`).
    pub root_margin: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: String::from(DEFAULT_ROOT_MARGIN),
        }
    }
}

impl TrackerConfig {
    pub fn new(threshold: f64, root_margin: impl Into<String>) -> Self {
        Self {
            threshold,
            root_margin: root_margin.into(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: impl Into<String>) -> Self {
        self.root_margin = root_margin.into();
        self
    }

    /// Checks the threshold range and parses the root margin.
    pub fn validate(&self) -> Result<ObserveOptions, TrackerError> {
        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(TrackerError::InvalidThreshold(self.threshold));
        }
        let root_margin = self.root_margin.parse::<RootMargin>()?;
        Ok(ObserveOptions {
            threshold: self.threshold,
            root_margin,
        })
    }
}

/// A validated [`TrackerConfig`], as handed to an [`crate::ObservationBackend`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserveOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::ZERO,
        }
    }
}
