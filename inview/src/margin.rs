use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use crate::TrackerError;

/// A single side of a root margin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarginLength {
    /// Absolute distance in CSS pixels. Negative values shrink the root.
    Px(f64),
    /// Percentage of the root's extent on the same axis.
    Percent(f64),
}

impl MarginLength {
    /// Resolves this length to pixels against the root's extent on the same axis.
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => extent * p / 100.0,
        }
    }

    fn parse_token(token: &str) -> Result<Self, &'static str> {
        if let Some(number) = token.strip_suffix('%') {
            return parse_finite(number).map(Self::Percent);
        }

        let has_px = token.len() > 2
            && token
                .get(token.len() - 2..)
                .is_some_and(|unit| unit.eq_ignore_ascii_case("px"));
        if has_px {
            return parse_finite(&token[..token.len() - 2]).map(Self::Px);
        }

        // Unitless lengths are only valid for zero.
        match token.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(Self::Px(0.0)),
            Ok(_) => Err("lengths must use px or %"),
            Err(_) => Err("not a number"),
        }
    }
}

fn parse_finite(number: &str) -> Result<f64, &'static str> {
    match number.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err("length must be finite"),
        Err(_) => Err("not a number"),
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// A proximity offset applied to the root bounds before intersecting.
///
/// Parses CSS margin shorthand: one to four lengths, expanded as
/// `top [right [bottom [left]]]`.
///
/// ```
/// use inview::{MarginLength, RootMargin};
///
/// let m: RootMargin = "10px 5%".parse().unwrap();
/// assert_eq!(m.top, MarginLength::Px(10.0));
/// assert_eq!(m.right, MarginLength::Percent(5.0));
/// assert_eq!(m.to_string(), "10px 5% 10px 5%");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl RootMargin {
    pub const ZERO: Self = Self::uniform(MarginLength::Px(0.0));

    pub const fn uniform(len: MarginLength) -> Self {
        Self {
            top: len,
            right: len,
            bottom: len,
            left: len,
        }
    }

    pub const fn px(v: f64) -> Self {
        Self::uniform(MarginLength::Px(v))
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = TrackerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TrackerError::InvalidRootMargin {
            input: input.to_string(),
            reason,
        };

        let mut sides = [MarginLength::Px(0.0); 4];
        let mut n = 0usize;
        for token in input.split_ascii_whitespace() {
            if n == sides.len() {
                return Err(invalid("expected at most 4 lengths"));
            }
            sides[n] = MarginLength::parse_token(token).map_err(invalid)?;
            n += 1;
        }

        let [a, b, c, d] = sides;
        match n {
            0 => Err(invalid("empty margin")),
            1 => Ok(Self::uniform(a)),
            2 => Ok(Self {
                top: a,
                right: b,
                bottom: a,
                left: b,
            }),
            3 => Ok(Self {
                top: a,
                right: b,
                bottom: c,
                left: b,
            }),
            _ => Ok(Self {
                top: a,
                right: b,
                bottom: c,
                left: d,
            }),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
