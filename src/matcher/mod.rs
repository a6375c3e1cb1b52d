//! Pattern matching for encoded public keys.
//!
//! Supports plain substring search, optionally with ASCII case folding.
//! The [`Matcher`] trait is the seam workers test candidates through.

mod target;

pub use target::{Matcher, SearchTarget, TargetError};
