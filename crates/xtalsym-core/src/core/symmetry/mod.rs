//! # Symmetry Module
//!
//! Crystallographic symmetry codes and the operation algebra consumed by
//! the expansion engine.
//!
//! A symmetry instance is written `"<operationId>_<translationDigits>"`
//! (e.g. `"2_555"`), combining one operator of the space group with a
//! lattice translation in the conventional base-5 digit encoding. The
//! engine only ever composes codes and applies them to atoms; both
//! operations are specified by the [`ops::SymmetryProvider`] trait so the
//! operator table stays a pluggable dependency. [`ops::SpaceGroup`] is the
//! concrete table-backed implementation, built from CIF-style operator
//! strings or loaded from TOML (see [`registry`]).

pub mod code;
pub mod ops;
pub mod registry;
