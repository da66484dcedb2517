//! # Core Module
//!
//! This module provides the fundamental building blocks for crystal
//! structure representation and symmetry algebra in XtalSym, serving as the
//! stateless foundation the expansion engine operates on.
//!
//! ## Overview
//!
//! The core module implements the data structures and pure computations
//! required to describe an asymmetric unit and its crystallographic
//! context: unit-cell geometry, fractional/Cartesian coordinates, thermal
//! displacement models, atoms, bonds, hydrogen bonds, and the space-group
//! operator algebra.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Unit cell, positions,
//!   displacement parameters, atoms, bonds, and the crystal structure
//!   container with its connectivity partition
//! - **Symmetry Algebra** ([`symmetry`]) - Symmetry codes, the operator
//!   composition/application contract, and space-group operator tables
//! - **Utilities** ([`utils`]) - Static element-symbol data
//!
//! ## Key Capabilities
//!
//! - **Complete asymmetric-unit representation** with label-addressed atoms
//! - **Fractional to Cartesian conversion** derived once per cell
//! - **Displacement ellipsoid transforms** guaranteed right-handed
//! - **Composable symmetry codes** in the conventional `"<op>_<555>"` form
//! - **Pluggable operator tables** parsed from CIF-style Jones notation

pub mod models;
pub mod symmetry;
pub mod utils;
