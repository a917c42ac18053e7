//! UI-layer utilities for the `inview` crate.
//!
//! The `inview` crate is UI-agnostic and focuses on the visibility subscription itself. This
//! crate provides small, framework-neutral helpers an anime-browsing UI layer needs around it:
//!
//! - A lifecycle `Controller` (mount / re-target / reconfigure / unmount) with best-effort
//!   degradation when no observation backend exists
//! - Stable popularity sorting for list views
//! - Payload validators for user, feedback and credential forms (`feature = "std"`)
//!
//! This crate is intentionally framework-agnostic (no yew/leptos/dioxus bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod sort;
#[cfg(feature = "std")]
pub mod validate;


pub use controller::Controller;
pub use sort::{
    AnimeSummary, ParseSortOrderError, Popularity, SortOrder, sort_by_popularity,
    sort_by_popularity_in_place,
};
#[cfg(feature = "std")]
pub use validate::{
    Credentials, Feedback, NewUser, Validated, ValidationError, validate_credentials,
    validate_feedback, validate_user,
};
#[cfg(all(feature = "std", feature = "serde"))]
pub use validate::{validate_credentials_json, validate_feedback_json, validate_user_json};
