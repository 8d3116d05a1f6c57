//! Immutable 4x4 homogeneous matrices.
//!
//! The determinant and the inverse are derived once, at construction, by LU
//! decomposition with partial pivoting. A matrix whose decomposition hits a
//! vanishing pivot is marked singular; it is still a usable value (it can be
//! multiplied and transposed) but asking for its inverse or determinant
//! returns [`MathError::SingularMatrix`].

use std::fmt;
use std::ops::Mul;

use glam::{DMat4, DVec4};

use crate::{MathError, MathResult, EPSILON};

/// Pivots smaller than this are treated as zero during decomposition.
const SINGULAR_TOLERANCE: f64 = 1e-12;

type Rows = [[f64; 4]; 4];

/// A 4x4 matrix with its inverse and determinant precomputed.
#[derive(Clone, Copy, Debug)]
pub struct Matrix {
    m: DMat4,
    inverse: Option<DMat4>,
    determinant: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m: DMat4::IDENTITY,
        inverse: Some(DMat4::IDENTITY),
        determinant: 1.0,
    };

    /// Build a matrix from row-major elements.
    pub fn from_rows(rows: Rows) -> Self {
        Self::from_dmat4(DMat4::from_cols_array_2d(&rows).transpose())
    }

    /// Wrap a glam matrix, decomposing it immediately.
    pub fn from_dmat4(m: DMat4) -> Self {
        match lu_invert(to_rows(&m)) {
            Some((determinant, inverse)) => Self {
                m,
                inverse: Some(DMat4::from_cols_array_2d(&inverse).transpose()),
                determinant,
            },
            None => Self {
                m,
                inverse: None,
                determinant: 0.0,
            },
        }
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m.col(col)[row]
    }

    #[inline]
    pub fn as_dmat4(&self) -> &DMat4 {
        &self.m
    }

    pub fn is_invertible(&self) -> bool {
        self.inverse.is_some()
    }

    pub fn determinant(&self) -> MathResult<f64> {
        match self.inverse {
            Some(_) => Ok(self.determinant),
            None => Err(MathError::SingularMatrix),
        }
    }

    pub fn inverse(&self) -> MathResult<Matrix> {
        let inv = self.inverse.ok_or(MathError::SingularMatrix)?;
        Ok(Self {
            m: inv,
            inverse: Some(self.m),
            determinant: 1.0 / self.determinant,
        })
    }

    pub fn transpose(&self) -> Matrix {
        Self {
            m: self.m.transpose(),
            inverse: self.inverse.map(|inv| inv.transpose()),
            determinant: self.determinant,
        }
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Matrix) -> Matrix {
        Self::from_dmat4(self.m * other.m)
    }

    #[inline]
    pub fn mul_vec4(&self, v: DVec4) -> DVec4 {
        self.m * v
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Matrix) -> bool {
        self.m
            .to_cols_array()
            .iter()
            .zip(other.m.to_cols_array().iter())
            .all(|(a, b)| (a - b).abs() <= EPSILON)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, other: Matrix) -> Matrix {
        Matrix::mul(&self, &other)
    }
}

impl From<DMat4> for Matrix {
    fn from(m: DMat4) -> Self {
        Self::from_dmat4(m)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in to_rows(&self.m) {
            writeln!(f, "[{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

fn to_rows(m: &DMat4) -> Rows {
    m.transpose().to_cols_array_2d()
}

/// Invert a row-major matrix by LU decomposition with partial pivoting.
///
/// Returns the determinant and the row-major inverse, or `None` when a pivot
/// vanishes.
fn lu_invert(a: Rows) -> Option<(f64, Rows)> {
    let mut lu = a;
    let mut perm = [0usize, 1, 2, 3];
    let mut sign = 1.0;

    for k in 0..4 {
        let mut pivot = k;
        let mut largest = lu[k][k].abs();
        for (i, row) in lu.iter().enumerate().skip(k + 1) {
            if row[k].abs() > largest {
                largest = row[k].abs();
                pivot = i;
            }
        }

        if largest < SINGULAR_TOLERANCE {
            return None;
        }

        if pivot != k {
            lu.swap(pivot, k);
            perm.swap(pivot, k);
            sign = -sign;
        }

        for i in (k + 1)..4 {
            let factor = lu[i][k] / lu[k][k];
            lu[i][k] = factor;
            for j in (k + 1)..4 {
                lu[i][j] -= factor * lu[k][j];
            }
        }
    }

    let determinant = sign * lu[0][0] * lu[1][1] * lu[2][2] * lu[3][3];

    // Solve L U x = P e_col for every column of the identity.
    let mut inverse = [[0.0; 4]; 4];
    for col in 0..4 {
        let mut y = [0.0; 4];
        for i in 0..4 {
            let mut sum = if perm[i] == col { 1.0 } else { 0.0 };
            for j in 0..i {
                sum -= lu[i][j] * y[j];
            }
            y[i] = sum;
        }

        let mut x = [0.0; 4];
        for i in (0..4).rev() {
            let mut sum = y[i];
            for j in (i + 1)..4 {
                sum -= lu[i][j] * x[j];
            }
            x[i] = sum / lu[i][i];
        }

        for (i, value) in x.iter().enumerate() {
            inverse[i][col] = *value;
        }
    }

    Some((determinant, inverse))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows([
            [-5.0, 2.0, 6.0, -8.0],
            [1.0, -5.0, 1.0, 8.0],
            [7.0, 7.0, -6.0, -7.0],
            [1.0, -3.0, 7.0, 4.0],
        ])
    }

    #[test]
    fn test_get_is_row_major() {
        let m = sample();

        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(2, 0), 7.0);
        assert_eq!(m.get(3, 3), 4.0);
    }

    #[test]
    fn test_determinant() {
        let m = sample();
        assert!((m.determinant().unwrap() - 532.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_known_values() {
        let inv = sample().inverse().unwrap();

        assert!((inv.get(3, 2) - (-160.0 / 532.0)).abs() < 1e-12);
        assert!((inv.get(2, 3) - (105.0 / 532.0)).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let m = sample();
        let inv = m.inverse().unwrap();

        assert_eq!(m * inv, Matrix::IDENTITY);
        assert_eq!(inv * m, Matrix::IDENTITY);
    }

    #[test]
    fn test_pivoting_handles_zero_leading_element() {
        let m = Matrix::from_rows([
            [0.0, 1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);

        assert!((m.determinant().unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(m.inverse().unwrap(), m);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Matrix::from_rows([
            [-4.0, 2.0, -2.0, -3.0],
            [9.0, 6.0, 2.0, 6.0],
            [0.0, -5.0, 1.0, -5.0],
            [0.0, 0.0, 0.0, 0.0],
        ]);

        assert!(!m.is_invertible());
        assert_eq!(m.inverse(), Err(MathError::SingularMatrix));
        assert_eq!(m.determinant(), Err(MathError::SingularMatrix));

        // Still usable as a value.
        assert_eq!(m.transpose().get(1, 0), 2.0);
    }

    #[test]
    fn test_transpose() {
        let m = sample();
        let t = m.transpose();

        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(m.get(r, c), t.get(c, r));
            }
        }
        assert_eq!(t.inverse().unwrap(), m.inverse().unwrap().transpose());
    }
}
