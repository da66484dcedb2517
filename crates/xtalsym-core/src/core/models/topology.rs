use crate::core::symmetry::code::SiteSymmetry;

/// A covalent bond between two atoms, referenced by label.
///
/// `symmetry` applies to the second endpoint: `"."` means both atoms sit in
/// the asymmetric unit, any code means `atom2` is reached through that
/// symmetry operation. Geometry values from the source file are carried
/// through expansion unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub atom1: String,
    pub atom2: String,
    pub symmetry: SiteSymmetry,
    pub length: Option<f64>,     // Angstroms
    pub length_su: Option<f64>,  // standard uncertainty of the length
}

impl Bond {
    pub fn new(atom1: &str, atom2: &str, symmetry: SiteSymmetry) -> Self {
        Self {
            atom1: atom1.to_string(),
            atom2: atom2.to_string(),
            symmetry,
            length: None,
            length_su: None,
        }
    }

    pub fn with_length(mut self, length: f64, su: Option<f64>) -> Self {
        self.length = Some(length);
        self.length_su = su;
        self
    }

    pub fn references(&self, label: &str) -> bool {
        self.atom1 == label || self.atom2 == label
    }
}

/// A donor-hydrogen...acceptor contact. `symmetry` applies to the acceptor.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrogenBond {
    pub donor: String,
    pub hydrogen: String,
    pub acceptor: String,
    pub symmetry: SiteSymmetry,
    pub donor_hydrogen: Option<f64>,
    pub hydrogen_acceptor: Option<f64>,
    pub donor_acceptor: Option<f64>,
    pub angle: Option<f64>, // D-H...A angle in degrees
}

impl HydrogenBond {
    pub fn new(donor: &str, hydrogen: &str, acceptor: &str, symmetry: SiteSymmetry) -> Self {
        Self {
            donor: donor.to_string(),
            hydrogen: hydrogen.to_string(),
            acceptor: acceptor.to_string(),
            symmetry,
            donor_hydrogen: None,
            hydrogen_acceptor: None,
            donor_acceptor: None,
            angle: None,
        }
    }

    pub fn references(&self, label: &str) -> bool {
        self.donor == label || self.hydrogen == label || self.acceptor == label
    }
}
