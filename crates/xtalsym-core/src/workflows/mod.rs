//! # Workflows Module
//!
//! High-level entry points tying the [`crate::core`] data model and the
//! [`crate::engine`] expansion logic together.
//!
//! - **Symmetry Expansion** ([`expansion`]) - grows an asymmetric unit
//!   into a chemically complete local neighborhood, safe to call
//!   repeatedly.

pub mod expansion;
