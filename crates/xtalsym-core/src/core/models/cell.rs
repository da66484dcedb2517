use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

/// Errors raised when constructing a [`UnitCell`] from invalid parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CellParameterError {
    #[error("cell length {name} must be positive and finite, got {value}")]
    InvalidLength { name: &'static str, value: f64 },

    #[error("cell angle {name} must lie strictly between 0 and 180 degrees, got {value}")]
    InvalidAngle { name: &'static str, value: f64 },

    #[error("cell angles produce a degenerate cell of non-positive volume")]
    DegenerateVolume,
}

/// Unit-cell parameters and the derived fractional-to-Cartesian transform.
///
/// Lengths are in Angstroms, angles in degrees. The transform follows the
/// standard crystallographic convention: the `a` axis lies along Cartesian x
/// and the `b` axis lies in the xy plane. The matrix is computed once at
/// construction; a `UnitCell` is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
    frac_to_cart: Matrix3<f64>,
    volume: f64,
}

impl UnitCell {
    /// Validates the six cell parameters and derives the transform matrix.
    ///
    /// # Arguments
    ///
    /// * `a`, `b`, `c` - Cell edge lengths in Angstroms (strictly positive).
    /// * `alpha`, `beta`, `gamma` - Cell angles in degrees, each in (0, 180).
    ///
    /// # Errors
    ///
    /// Returns a [`CellParameterError`] when a length is non-positive, an
    /// angle is out of range, or the angle combination yields a cell with
    /// non-positive volume.
    pub fn new(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, CellParameterError> {
        for (name, value) in [("a", a), ("b", b), ("c", c)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CellParameterError::InvalidLength { name, value });
            }
        }
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(value.is_finite() && value > 0.0 && value < 180.0) {
                return Err(CellParameterError::InvalidAngle { name, value });
            }
        }

        let (cos_a, cos_b, cos_g) = (
            alpha.to_radians().cos(),
            beta.to_radians().cos(),
            gamma.to_radians().cos(),
        );
        let sin_g = gamma.to_radians().sin();

        // Squared volume of the unit parallelepiped spanned by the axis
        // directions; non-positive means the three angles are incompatible.
        let v_sq = 1.0 - cos_a * cos_a - cos_b * cos_b - cos_g * cos_g + 2.0 * cos_a * cos_b * cos_g;
        if v_sq <= 0.0 {
            return Err(CellParameterError::DegenerateVolume);
        }
        let v = v_sq.sqrt();

        let frac_to_cart = Matrix3::new(
            a,
            b * cos_g,
            c * cos_b,
            0.0,
            b * sin_g,
            c * (cos_a - cos_b * cos_g) / sin_g,
            0.0,
            0.0,
            c * v / sin_g,
        );

        Ok(Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
            frac_to_cart,
            volume: a * b * c * v,
        })
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Cell edge lengths as `[a, b, c]`, used for per-axis tolerances.
    pub fn lengths(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    /// Cell volume in cubic Angstroms.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// The fractional-to-Cartesian transform matrix (column vectors are the
    /// cell axes expressed in Cartesian coordinates).
    pub fn frac_to_cart(&self) -> &Matrix3<f64> {
        &self.frac_to_cart
    }

    /// Converts a fractional coordinate to Cartesian Angstroms.
    pub fn to_cartesian(&self, fractional: &Vector3<f64>) -> Point3<f64> {
        Point3::from(self.frac_to_cart * fractional)
    }

    /// Reciprocal axis lengths `[a*, b*, c*]`, needed to re-express
    /// CIF-basis displacement tensors in the Cartesian frame.
    pub fn reciprocal_lengths(&self) -> [f64; 3] {
        let sin_a = self.alpha.to_radians().sin();
        let sin_b = self.beta.to_radians().sin();
        let sin_g = self.gamma.to_radians().sin();
        [
            self.b * self.c * sin_a / self.volume,
            self.a * self.c * sin_b / self.volume,
            self.a * self.b * sin_g / self.volume,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn orthorhombic_cell_has_diagonal_transform() {
        let cell = UnitCell::new(10.0, 20.0, 30.0, 90.0, 90.0, 90.0).unwrap();
        let m = cell.frac_to_cart();

        assert!(close(m[(0, 0)], 10.0));
        assert!(close(m[(1, 1)], 20.0));
        assert!(close(m[(2, 2)], 30.0));
        assert!(close(m[(0, 1)], 0.0));
        assert!(close(m[(1, 2)], 0.0));
        assert!(close(cell.volume(), 6000.0));
    }

    #[test]
    fn monoclinic_cell_places_b_in_xy_plane() {
        let cell = UnitCell::new(5.0, 6.0, 7.0, 90.0, 105.0, 90.0).unwrap();
        let m = cell.frac_to_cart();

        // a along x, b along y, c tilted in the xz plane for beta != 90.
        assert!(close(m[(0, 0)], 5.0));
        assert!(close(m[(1, 0)], 0.0));
        assert!(close(m[(1, 1)], 6.0));
        assert!(close(m[(0, 2)], 7.0 * 105.0f64.to_radians().cos()));
        assert!(close(m[(1, 2)], 0.0));
        assert!(m[(2, 2)] > 0.0);
    }

    #[test]
    fn to_cartesian_maps_unit_corners_onto_axes() {
        let cell = UnitCell::new(4.0, 5.0, 6.0, 90.0, 90.0, 90.0).unwrap();

        let p = cell.to_cartesian(&Vector3::new(1.0, 0.0, 0.0));
        assert!(close(p.x, 4.0) && close(p.y, 0.0) && close(p.z, 0.0));

        let q = cell.to_cartesian(&Vector3::new(0.5, 0.5, 0.5));
        assert!(close(q.x, 2.0) && close(q.y, 2.5) && close(q.z, 3.0));
    }

    #[test]
    fn reciprocal_lengths_invert_axis_lengths_for_orthogonal_cells() {
        let cell = UnitCell::new(4.0, 5.0, 8.0, 90.0, 90.0, 90.0).unwrap();
        let [ra, rb, rc] = cell.reciprocal_lengths();
        assert!(close(ra, 0.25));
        assert!(close(rb, 0.2));
        assert!(close(rc, 0.125));
    }

    #[test]
    fn rejects_non_positive_lengths() {
        assert_eq!(
            UnitCell::new(0.0, 5.0, 6.0, 90.0, 90.0, 90.0),
            Err(CellParameterError::InvalidLength {
                name: "a",
                value: 0.0
            })
        );
        assert!(matches!(
            UnitCell::new(4.0, -1.0, 6.0, 90.0, 90.0, 90.0),
            Err(CellParameterError::InvalidLength { name: "b", .. })
        ));
        assert!(matches!(
            UnitCell::new(4.0, 5.0, f64::NAN, 90.0, 90.0, 90.0),
            Err(CellParameterError::InvalidLength { name: "c", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_angles() {
        assert!(matches!(
            UnitCell::new(4.0, 5.0, 6.0, 0.0, 90.0, 90.0),
            Err(CellParameterError::InvalidAngle { name: "alpha", .. })
        ));
        assert!(matches!(
            UnitCell::new(4.0, 5.0, 6.0, 90.0, 180.0, 90.0),
            Err(CellParameterError::InvalidAngle { name: "beta", .. })
        ));
        assert!(matches!(
            UnitCell::new(4.0, 5.0, 6.0, 90.0, 90.0, -30.0),
            Err(CellParameterError::InvalidAngle { name: "gamma", .. })
        ));
    }

    #[test]
    fn rejects_degenerate_angle_combinations() {
        // Three 170-degree angles cannot close a parallelepiped.
        assert_eq!(
            UnitCell::new(4.0, 5.0, 6.0, 170.0, 170.0, 170.0),
            Err(CellParameterError::DegenerateVolume)
        );
    }
}
