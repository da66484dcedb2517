use super::cell::UnitCell;
use nalgebra::{Matrix3, SymmetricEigen};

/// Six independent components of an anisotropic displacement tensor in the
/// CIF basis (dimensionless, relative to the reciprocal cell axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnisotropicDisplacement {
    pub u11: f64,
    pub u22: f64,
    pub u33: f64,
    pub u12: f64,
    pub u13: f64,
    pub u23: f64,
}

/// A model of an atom's thermal motion, rendered as a sphere (isotropic) or
/// an ellipsoid (anisotropic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplacementParameter {
    /// Mean-square displacement, a single scalar >= 0.
    Isotropic(f64),
    Anisotropic(AnisotropicDisplacement),
}

impl AnisotropicDisplacement {
    /// The symmetric tensor as a matrix in the CIF basis.
    pub fn as_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.u11, self.u12, self.u13, //
            self.u12, self.u22, self.u23, //
            self.u13, self.u23, self.u33,
        )
    }

    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        Self {
            u11: m[(0, 0)],
            u22: m[(1, 1)],
            u33: m[(2, 2)],
            u12: m[(0, 1)],
            u13: m[(0, 2)],
            u23: m[(1, 2)],
        }
    }

    /// Re-expresses the tensor under a fractional-basis rotation `R` as
    /// `R U R^T`. Used when generating symmetry-equivalent atoms.
    pub fn transformed_by(&self, rotation: &Matrix3<f64>) -> Self {
        let u = self.as_matrix();
        Self::from_matrix(&(rotation * u * rotation.transpose()))
    }

    /// The tensor re-expressed in the Cartesian frame:
    /// `U_cart = A N U N A^T` with `A` the fractional-to-Cartesian matrix
    /// and `N` the diagonal matrix of reciprocal axis lengths.
    pub fn cartesian_tensor(&self, cell: &UnitCell) -> Matrix3<f64> {
        let [ra, rb, rc] = cell.reciprocal_lengths();
        let n = Matrix3::from_diagonal(&nalgebra::Vector3::new(ra, rb, rc));
        let a = cell.frac_to_cart();
        let an = a * n;
        an * self.as_matrix() * an.transpose()
    }

    /// Derives the ellipsoid orientation/scale matrix: eigenvectors of the
    /// Cartesian-frame tensor scaled by the square root of their
    /// eigenvalues.
    ///
    /// The returned matrix is always a proper rotation times a positive
    /// scale (determinant > 0); a left-handed eigenbasis is renormalized by
    /// flipping one axis so the ellipsoid is never rendered mirrored.
    ///
    /// # Return
    ///
    /// `None` when the tensor is not positive definite; callers fall back
    /// to a default shape instead of treating this as an error.
    pub fn ellipsoid_transform(&self, cell: &UnitCell) -> Option<Matrix3<f64>> {
        let eigen = SymmetricEigen::new(self.cartesian_tensor(cell));
        if eigen.eigenvalues.iter().any(|&v| v <= 0.0 || !v.is_finite()) {
            return None;
        }

        let mut basis = eigen.eigenvectors;
        if basis.determinant() < 0.0 {
            // Negating one eigenvector keeps the decomposition valid and
            // restores right-handedness.
            let flipped = -basis.column(0);
            basis.set_column(0, &flipped);
        }

        let scales = eigen.eigenvalues.map(|v| v.sqrt());
        Some(basis * Matrix3::from_diagonal(&scales))
    }
}

impl DisplacementParameter {
    /// Ellipsoid transform for anisotropic parameters; isotropic parameters
    /// yield a uniform scaling (a sphere of radius sqrt(U)).
    ///
    /// Returns `None` for non-positive-definite tensors or negative
    /// isotropic values, signalling the caller to use a default shape.
    pub fn ellipsoid_transform(&self, cell: &UnitCell) -> Option<Matrix3<f64>> {
        match self {
            DisplacementParameter::Isotropic(u) => {
                if *u >= 0.0 && u.is_finite() {
                    Some(Matrix3::identity() * u.sqrt())
                } else {
                    None
                }
            }
            DisplacementParameter::Anisotropic(aniso) => aniso.ellipsoid_transform(cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_cell() -> UnitCell {
        UnitCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 90.0).unwrap()
    }

    fn diagonal(u11: f64, u22: f64, u33: f64) -> AnisotropicDisplacement {
        AnisotropicDisplacement {
            u11,
            u22,
            u33,
            u12: 0.0,
            u13: 0.0,
            u23: 0.0,
        }
    }

    #[test]
    fn diagonal_tensor_yields_sqrt_scaled_axes() {
        let cell = cubic_cell();
        let aniso = diagonal(0.04, 0.09, 0.16);
        let t = aniso.ellipsoid_transform(&cell).unwrap();

        // Eigenvalues of a diagonal tensor in an orthogonal cell are the
        // diagonal entries; the column norms are their square roots.
        let mut norms: Vec<f64> = (0..3).map(|i| t.column(i).norm()).collect();
        norms.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((norms[0] - 0.2).abs() < 1e-9);
        assert!((norms[1] - 0.3).abs() < 1e-9);
        assert!((norms[2] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn ellipsoid_transform_is_always_right_handed() {
        let cell = cubic_cell();
        let aniso = AnisotropicDisplacement {
            u11: 0.05,
            u22: 0.04,
            u33: 0.06,
            u12: 0.01,
            u13: -0.005,
            u23: 0.002,
        };
        let t = aniso.ellipsoid_transform(&cell).unwrap();
        assert!(t.determinant() > 0.0);
    }

    #[test]
    fn non_positive_definite_tensor_falls_back_to_none() {
        let cell = cubic_cell();
        assert!(diagonal(-0.01, 0.02, 0.03).ellipsoid_transform(&cell).is_none());
        assert!(diagonal(0.0, 0.02, 0.03).ellipsoid_transform(&cell).is_none());
    }

    #[test]
    fn isotropic_parameter_yields_uniform_scale() {
        let cell = cubic_cell();
        let t = DisplacementParameter::Isotropic(0.04)
            .ellipsoid_transform(&cell)
            .unwrap();
        assert!((t[(0, 0)] - 0.2).abs() < 1e-12);
        assert!((t[(1, 1)] - 0.2).abs() < 1e-12);
        assert!((t[(2, 2)] - 0.2).abs() < 1e-12);

        assert!(
            DisplacementParameter::Isotropic(-0.1)
                .ellipsoid_transform(&cell)
                .is_none()
        );
    }

    #[test]
    fn transformed_by_conjugates_the_tensor() {
        let aniso = diagonal(0.04, 0.09, 0.16);
        // A rotation swapping x and y (with a sign to stay proper).
        let r = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let t = aniso.transformed_by(&r);
        assert!((t.u11 - 0.09).abs() < 1e-12);
        assert!((t.u22 - 0.04).abs() < 1e-12);
        assert!((t.u33 - 0.16).abs() < 1e-12);
    }
}
