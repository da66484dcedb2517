//! # Core Models Module
//!
//! This module contains the data structures used to represent crystal
//! structures in XtalSym, providing the foundation for symmetry expansion.
//!
//! ## Key Components
//!
//! - [`cell`] - Unit-cell parameters and the fractional→Cartesian transform
//! - [`position`] - Coordinates tagged as fractional or Cartesian
//! - [`displacement`] - Isotropic/anisotropic thermal displacement models
//! - [`atom`] - Individual atom representation addressed by unique label
//! - [`topology`] - Bonds and hydrogen bonds with site-symmetry codes
//! - [`structure`] - The complete structure container with its cached
//!   connectivity partition
//! - [`ids`] - Stable atom identifiers
//!
//! ## Usage
//!
//! ```ignore
//! use xtalsym::core::models::{atom::Atom, cell::UnitCell, structure::CrystalStructure};
//!
//! let cell = UnitCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 90.0)?;
//! let mut structure = CrystalStructure::new(cell, space_group);
//! structure.add_atom(Atom::new("C1", "C", position));
//! structure.rebuild_connectivity();
//! ```

pub mod atom;
pub mod cell;
pub mod displacement;
pub mod ids;
pub mod position;
pub mod structure;
pub mod topology;
