use super::displacement::DisplacementParameter;
use super::position::Position;

/// Represents one atom of a crystal structure.
///
/// Atoms are identified by their label, which is unique within a structure
/// instance. Symmetry-generated copies carry the originating label plus the
/// generating code (see [`crate::core::symmetry::code::symmetry_label`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Unique label within the structure (e.g. "C1", "O3", "N1@2_565").
    pub label: String,
    /// Element symbol (e.g. "C", "Fe"), normalized on insertion.
    pub element: String,
    /// The atom's coordinate, fractional or Cartesian.
    pub position: Position,
    /// Thermal displacement model, when the source file provides one.
    pub displacement: Option<DisplacementParameter>,
    /// Disorder group: 0 is compatible with every group, values > 0 mark
    /// mutually exclusive alternate sites.
    pub disorder_group: i32,
}

impl Atom {
    /// Creates an atom with no displacement parameter and disorder group 0.
    pub fn new(label: &str, element: &str, position: Position) -> Self {
        Self {
            label: label.to_string(),
            element: element.to_string(),
            position,
            displacement: None,
            disorder_group: 0,
        }
    }

    pub fn with_displacement(mut self, displacement: DisplacementParameter) -> Self {
        self.displacement = Some(displacement);
        self
    }

    pub fn with_disorder_group(mut self, group: i32) -> Self {
        self.disorder_group = group;
        self
    }
}
