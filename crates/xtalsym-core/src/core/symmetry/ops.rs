use super::code::{OpId, SymmetryCode};
use crate::core::models::atom::Atom;
use crate::core::models::displacement::DisplacementParameter;
use crate::core::models::position::Position;
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Numerical slack when matching rotation parts and deciding whether a
/// residual translation is integral.
const MATCH_EPSILON: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SymmetryError {
    #[error("operation id {0} is not a member of the space group")]
    UnknownOperation(OpId),

    #[error("failed to parse symmetry operator '{operator}': {reason}")]
    ParseOperator { operator: String, reason: String },

    #[error("the first operator of a space group must be the identity, got '{0}'")]
    MissingIdentity(String),

    #[error("a space group requires at least one operator")]
    EmptyOperatorList,

    #[error("composition of '{a}' and '{b}' falls outside the operator table")]
    CompositionOutsideGroup { a: SymmetryCode, b: SymmetryCode },

    #[error("cannot apply symmetry operation to the Cartesian position of atom '{0}'")]
    CartesianPosition(String),
}

/// One space-group operator as an affine map on fractional coordinates:
/// `x' = R x + t`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl SymmetryOperation {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self { rotation, translation }
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn is_identity(&self) -> bool {
        rotations_match(&self.rotation, &Matrix3::identity())
            && self.translation.iter().all(|t| t.abs() < MATCH_EPSILON)
    }

    /// Parses one operator in CIF/Jones notation, e.g. `"x, y, z"` or
    /// `"-x, y+1/2, -z+1/2"`. Coefficients may be signed fractions or
    /// decimals (`"2/3+x"`, `"0.5-y"`).
    pub fn parse(operator: &str) -> Result<Self, SymmetryError> {
        let components: Vec<&str> = operator.split(',').collect();
        if components.len() != 3 {
            return Err(SymmetryError::ParseOperator {
                operator: operator.to_string(),
                reason: format!("expected 3 comma-separated components, got {}", components.len()),
            });
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, component) in components.iter().enumerate() {
            let (coeffs, shift) =
                parse_component(component).map_err(|reason| SymmetryError::ParseOperator {
                    operator: operator.to_string(),
                    reason,
                })?;
            for (col, coeff) in coeffs.iter().enumerate() {
                rotation[(row, col)] = *coeff;
            }
            translation[row] = shift;
        }

        Ok(Self { rotation, translation })
    }
}

/// Parses one component of a Jones-notation operator into axis coefficients
/// and a translation shift.
fn parse_component(component: &str) -> Result<([f64; 3], f64), String> {
    let compact: String = component.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err("empty component".to_string());
    }

    let mut coeffs = [0.0f64; 3];
    let mut shift = 0.0f64;
    let mut sign = 1.0f64;
    let mut chars = compact.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '+' => {
                sign = 1.0;
                chars.next();
            }
            '-' => {
                sign = -1.0;
                chars.next();
            }
            'x' | 'X' => {
                coeffs[0] += sign;
                sign = 1.0;
                chars.next();
            }
            'y' | 'Y' => {
                coeffs[1] += sign;
                sign = 1.0;
                chars.next();
            }
            'z' | 'Z' => {
                coeffs[2] += sign;
                sign = 1.0;
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut digits = String::new();
                while matches!(chars.peek(), Some('0'..='9') | Some('.')) {
                    digits.push(chars.next().expect("peeked"));
                }
                let mut value: f64 = digits
                    .parse()
                    .map_err(|_| format!("invalid number '{digits}'"))?;

                if chars.peek() == Some(&'/') {
                    chars.next();
                    let mut denom = String::new();
                    while matches!(chars.peek(), Some('0'..='9')) {
                        denom.push(chars.next().expect("peeked"));
                    }
                    let denom: f64 = denom
                        .parse()
                        .map_err(|_| format!("invalid denominator after '{digits}/'"))?;
                    if denom == 0.0 {
                        return Err("division by zero in fraction".to_string());
                    }
                    value /= denom;
                }

                // A numeric factor directly in front of an axis letter is a
                // coefficient; otherwise it is a translation term.
                match chars.peek() {
                    Some('x') | Some('X') => {
                        chars.next();
                        coeffs[0] += sign * value;
                    }
                    Some('y') | Some('Y') => {
                        chars.next();
                        coeffs[1] += sign * value;
                    }
                    Some('z') | Some('Z') => {
                        chars.next();
                        coeffs[2] += sign * value;
                    }
                    _ => shift += sign * value,
                }
                sign = 1.0;
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok((coeffs, shift))
}

fn rotations_match(a: &Matrix3<f64>, b: &Matrix3<f64>) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < MATCH_EPSILON)
}

/// The symmetry-operation algebra consumed by the expansion engine.
///
/// Implementations must be pure and reentrant: `combine` and `apply` are
/// total over valid codes and never observe or mutate shared state, which
/// is what allows independent expansions to run concurrently.
pub trait SymmetryProvider {
    /// The reserved id of the identity operation.
    fn identity_op(&self) -> OpId;

    /// The code meaning "no transform", conventionally `"1_555"`.
    fn identity_code(&self) -> SymmetryCode {
        SymmetryCode::new(self.identity_op(), [0, 0, 0])
    }

    /// Function composition `a` after `b`: the returned code applied once
    /// is equivalent to applying `b`, then `a`. Composition is associative
    /// but not commutative; callers must preserve the argument order.
    fn combine(&self, a: &SymmetryCode, b: &SymmetryCode) -> Result<SymmetryCode, SymmetryError>;

    /// Applies an operation to a set of atoms, returning new values with
    /// transformed positions and displacement tensors. Labels are left
    /// unchanged; the engine appends the symmetry suffix itself.
    fn apply(&self, code: &SymmetryCode, atoms: &[Atom]) -> Result<Vec<Atom>, SymmetryError>;
}

/// A concrete space group: an ordered operator table with 1-based ids,
/// id 1 reserved for the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceGroup {
    name: String,
    operations: Vec<SymmetryOperation>,
}

impl SpaceGroup {
    /// The trivial group P 1 (identity only), for structures without
    /// symmetry information.
    pub fn p1() -> Self {
        Self {
            name: "P 1".to_string(),
            operations: vec![SymmetryOperation::identity()],
        }
    }

    /// Builds a space group from Jones-notation operator strings. The
    /// first operator must be the identity `"x, y, z"`.
    pub fn from_operators(name: &str, operators: &[&str]) -> Result<Self, SymmetryError> {
        let first = operators.first().ok_or(SymmetryError::EmptyOperatorList)?;
        let parsed: Vec<SymmetryOperation> = operators
            .iter()
            .map(|op| SymmetryOperation::parse(op))
            .collect::<Result<_, _>>()?;
        if !parsed[0].is_identity() {
            return Err(SymmetryError::MissingIdentity(first.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            operations: parsed,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn operation(&self, op: OpId) -> Result<&SymmetryOperation, SymmetryError> {
        let index = op.get() as usize;
        if index == 0 || index > self.operations.len() {
            return Err(SymmetryError::UnknownOperation(op));
        }
        Ok(&self.operations[index - 1])
    }

    /// The full affine map of a code: operator rotation plus operator
    /// translation and lattice translation.
    fn affine(&self, code: &SymmetryCode) -> Result<(Matrix3<f64>, Vector3<f64>), SymmetryError> {
        let op = self.operation(code.op())?;
        let [t1, t2, t3] = code.translation();
        let lattice = Vector3::new(f64::from(t1), f64::from(t2), f64::from(t3));
        Ok((*op.rotation(), op.translation() + lattice))
    }

    /// Re-expresses an affine map as `operator id + integral lattice
    /// translation` by matching against the operator table.
    fn decompose(
        &self,
        rotation: &Matrix3<f64>,
        translation: &Vector3<f64>,
    ) -> Option<SymmetryCode> {
        for (index, op) in self.operations.iter().enumerate() {
            if !rotations_match(rotation, op.rotation()) {
                continue;
            }
            let residual = translation - op.translation();
            let rounded = residual.map(|r| r.round());
            if residual
                .iter()
                .zip(rounded.iter())
                .all(|(r, n)| (r - n).abs() < MATCH_EPSILON)
            {
                let digits = [rounded[0] as i8, rounded[1] as i8, rounded[2] as i8];
                return Some(SymmetryCode::new(OpId::new((index + 1) as u16), digits));
            }
        }
        None
    }
}

impl SymmetryProvider for SpaceGroup {
    fn identity_op(&self) -> OpId {
        OpId::new(1)
    }

    fn combine(&self, a: &SymmetryCode, b: &SymmetryCode) -> Result<SymmetryCode, SymmetryError> {
        let (ra, ta) = self.affine(a)?;
        let (rb, tb) = self.affine(b)?;
        // (Ra, ta) applied after (Rb, tb): x -> Ra (Rb x + tb) + ta.
        let rotation = ra * rb;
        let translation = ra * tb + ta;
        self.decompose(&rotation, &translation)
            .ok_or(SymmetryError::CompositionOutsideGroup { a: *a, b: *b })
    }

    fn apply(&self, code: &SymmetryCode, atoms: &[Atom]) -> Result<Vec<Atom>, SymmetryError> {
        let (rotation, translation) = self.affine(code)?;
        atoms
            .iter()
            .map(|atom| {
                let fractional = match &atom.position {
                    Position::Fractional(frac) => frac,
                    Position::Cartesian(_) => {
                        return Err(SymmetryError::CartesianPosition(atom.label.clone()));
                    }
                };
                let mut copy = atom.clone();
                copy.position = Position::Fractional(rotation * fractional + translation);
                if let Some(DisplacementParameter::Anisotropic(aniso)) = &atom.displacement {
                    copy.displacement = Some(DisplacementParameter::Anisotropic(
                        aniso.transformed_by(&rotation),
                    ));
                }
                Ok(copy)
            })
            .collect()
    }
}
