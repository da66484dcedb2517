use super::cell::UnitCell;
use nalgebra::{Point3, Vector3};

/// A 3-component coordinate tagged with the frame it is expressed in.
///
/// Fractional positions are relative to the unit-cell axes and convert to
/// Cartesian through the owning [`UnitCell`]; Cartesian positions are
/// already in final form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Fractional(Vector3<f64>),
    Cartesian(Point3<f64>),
}

impl Position {
    /// Resolves the position to Cartesian Angstroms. Total for any finite
    /// input; Cartesian positions pass through unchanged.
    pub fn to_cartesian(&self, cell: &UnitCell) -> Point3<f64> {
        match self {
            Position::Fractional(frac) => cell.to_cartesian(frac),
            Position::Cartesian(point) => *point,
        }
    }

    pub fn is_fractional(&self) -> bool {
        matches!(self, Position::Fractional(_))
    }

    /// The raw fractional coordinate, if this position carries one.
    pub fn fractional(&self) -> Option<&Vector3<f64>> {
        match self {
            Position::Fractional(frac) => Some(frac),
            Position::Cartesian(_) => None,
        }
    }
}
