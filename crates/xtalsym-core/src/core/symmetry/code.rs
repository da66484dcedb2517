use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between an original atom label and the symmetry code of the
/// operation that generated its copy (e.g. `"N1@2_565"`).
pub const SYMMETRY_LABEL_SEPARATOR: char = '@';

/// Identifier of one operation in a space-group operator table (1-based;
/// id 1 is reserved for the identity operation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(u16);

impl OpId {
    pub fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseSymmetryError {
    #[error("symmetry code '{0}' is missing the '_' separator")]
    MissingSeparator(String),

    #[error("symmetry code '{0}' has an invalid operation id")]
    InvalidOperationId(String),

    #[error("symmetry code '{0}' must carry exactly three translation digits")]
    InvalidTranslation(String),
}

/// One crystallographic symmetry operation instance: an operation id plus a
/// lattice translation, written `"<opId>_<digits>"` with the conventional
/// base-5 digit encoding (`"555"` = no extra translation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymmetryCode {
    op: OpId,
    translation: [i8; 3],
}

impl SymmetryCode {
    pub fn new(op: OpId, translation: [i8; 3]) -> Self {
        Self { op, translation }
    }

    pub fn op(&self) -> OpId {
        self.op
    }

    pub fn translation(&self) -> [i8; 3] {
        self.translation
    }

    pub fn has_translation(&self) -> bool {
        self.translation != [0, 0, 0]
    }

    /// Two codes are translational variants when they share the operation
    /// id but differ in lattice translation.
    pub fn is_translational_variant_of(&self, other: &SymmetryCode) -> bool {
        self.op == other.op && self.translation != other.translation
    }
}

impl fmt::Display for SymmetryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}{}{}",
            self.op,
            i32::from(self.translation[0]) + 5,
            i32::from(self.translation[1]) + 5,
            i32::from(self.translation[2]) + 5,
        )
    }
}

impl FromStr for SymmetryCode {
    type Err = ParseSymmetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op_part, digits_part) = s
            .split_once('_')
            .ok_or_else(|| ParseSymmetryError::MissingSeparator(s.to_string()))?;

        let op: u16 = op_part
            .parse()
            .map_err(|_| ParseSymmetryError::InvalidOperationId(s.to_string()))?;
        if op == 0 {
            return Err(ParseSymmetryError::InvalidOperationId(s.to_string()));
        }

        let digits: Vec<i8> = digits_part
            .chars()
            .filter_map(|c| c.to_digit(10).map(|d| d as i8 - 5))
            .collect();
        if digits.len() != 3 || digits_part.chars().count() != 3 {
            return Err(ParseSymmetryError::InvalidTranslation(s.to_string()));
        }

        Ok(Self::new(OpId::new(op), [digits[0], digits[1], digits[2]]))
    }
}

/// Site symmetry of a bond's second endpoint (an H-bond's acceptor): either
/// no operation at all (both endpoints sit in the asymmetric unit, written
/// `"."`) or a [`SymmetryCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteSymmetry {
    None,
    Code(SymmetryCode),
}

impl SiteSymmetry {
    pub fn code(&self) -> Option<&SymmetryCode> {
        match self {
            SiteSymmetry::None => None,
            SiteSymmetry::Code(code) => Some(code),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SiteSymmetry::None)
    }
}

impl fmt::Display for SiteSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteSymmetry::None => write!(f, "."),
            SiteSymmetry::Code(code) => write!(f, "{code}"),
        }
    }
}

impl FromStr for SiteSymmetry {
    type Err = ParseSymmetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "." {
            Ok(SiteSymmetry::None)
        } else {
            Ok(SiteSymmetry::Code(s.parse()?))
        }
    }
}

/// Builds the label of a symmetry-generated atom copy.
pub fn symmetry_label(base: &str, code: &SymmetryCode) -> String {
    format!("{base}{SYMMETRY_LABEL_SEPARATOR}{code}")
}

/// Splits a (possibly generated) label into its base label and, when
/// present, the generating symmetry code. Lets selection/picking logic
/// recover the originating atom and operation.
pub fn split_symmetry_label(label: &str) -> (&str, Option<&str>) {
    match label.split_once(SYMMETRY_LABEL_SEPARATOR) {
        Some((base, code)) => (base, Some(code)),
        None => (label, None),
    }
}
