use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Reverse;
use core::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order {0:?} (expected \"asc\" or \"desc\")")]
pub struct ParseSortOrderError(pub String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(ParseSortOrderError(String::from(s)))
        }
    }
}

/// Anything that can be ranked by popularity.
pub trait Popularity {
    /// Number of users who scored the item.
    fn popularity(&self) -> u64;
}

impl<T: Popularity + ?Sized> Popularity for &T {
    fn popularity(&self) -> u64 {
        (**self).popularity()
    }
}

/// The list-card shape of an anime entry.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimeSummary {
    pub id: u64,
    pub title: String,
    /// Number of users who scored the entry. Unknown counts as zero.
    pub scored_by: Option<u64>,
    pub score: Option<f64>,
    pub image_url: Option<String>,
}

impl AnimeSummary {
    pub fn new(id: u64, title: impl Into<String>, scored_by: Option<u64>) -> Self {
        Self {
            id,
            title: title.into(),
            scored_by,
            ..Self::default()
        }
    }
}

impl Popularity for AnimeSummary {
    fn popularity(&self) -> u64 {
        self.scored_by.unwrap_or(0)
    }
}

/// Returns a copy of `list` sorted by popularity.
///
/// The sort is stable: items with equal popularity keep their relative order. `order = None`
/// returns the items in their original order.
pub fn sort_by_popularity<T: Popularity + Clone>(list: &[T], order: Option<SortOrder>) -> Vec<T> {
    let mut out = list.to_vec();
    sort_by_popularity_in_place(&mut out, order);
    out
}

pub fn sort_by_popularity_in_place<T: Popularity>(list: &mut [T], order: Option<SortOrder>) {
    match order {
        None => {}
        Some(SortOrder::Asc) => list.sort_by_key(|item| item.popularity()),
        Some(SortOrder::Desc) => list.sort_by_key(|item| Reverse(item.popularity())),
    }
}
