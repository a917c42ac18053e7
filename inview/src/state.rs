/// A serializable snapshot of a tracker's state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerState {
    pub is_intersecting: bool,
    /// Whether a watch is currently established with the backend.
    pub attached: bool,
}
