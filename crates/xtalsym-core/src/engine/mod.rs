//! # Engine Module
//!
//! This module implements the symmetry expansion engine of XtalSym: the
//! logic that resolves symmetry-crossing bonds into a finite network of
//! group instances and materializes the atoms and bonds needed to display
//! complete chemical fragments.
//!
//! ## Overview
//!
//! Expansion runs in three stages. The connectivity stage aggregates every
//! symmetry-crossing bond/H-bond into seed connections between fragments.
//! The traversal stage explores those connections breadth-first, composing
//! symmetry codes hop by hop and filing translational duplicates as links
//! instead of expanding them, which keeps the crystal from growing without
//! bound. The materialization stage generates the required atom copies,
//! collapses copies that coincide at special positions, and emits deduped
//! bonds/H-bonds, including completion bonds that close rings against
//! already-existing atoms.
//!
//! ## Key Capabilities
//!
//! - **Bounded breadth-first exploration** with per-origin duplicate
//!   detection and a non-fatal iteration cap
//! - **Special-position collapsing** with label substitution in every
//!   referencing bond
//! - **Order-independent bond identifiers** preventing duplicate edges
//! - **Pure, single-pass execution** - the input structure is never
//!   mutated and all traversal state lives inside one invocation

pub mod config;
pub(crate) mod connectivity;
pub mod error;
pub(crate) mod materialize;
pub(crate) mod traversal;
