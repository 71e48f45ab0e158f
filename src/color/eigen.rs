//! Eigen decomposition of symmetric 3x3 matrices by cyclic Jacobi rotation.
//!
//! Reference: J. Kopp, "Efficient numerical diagonalization of hermitian 3x3
//! matrices", Int. J. Mod. Phys. C 19 (2008) 523-548.

use log::trace;

use crate::params::JACOBI_MAX_SWEEPS;
use crate::types::{Error, Result};

const N: usize = 3;

/// Eigenvalues and eigenvectors of a symmetric 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigen {
    /// Eigenvalues, in the order the sweeps left them.
    pub values: [f64; 3],
    /// Orthonormal eigenvectors stored as columns: `vectors[row][k]`.
    pub vectors: [[f64; 3]; 3],
}

impl SymmetricEigen {
    /// Eigenvector `k` (column `k`).
    #[inline]
    pub fn vector(&self, k: usize) -> [f64; 3] {
        [self.vectors[0][k], self.vectors[1][k], self.vectors[2][k]]
    }

    /// Reorder eigenpairs by decreasing eigenvalue.
    pub fn sorted_descending(self) -> Self {
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| self.values[b].total_cmp(&self.values[a]));

        let mut sorted = self;
        for (dst, &src) in order.iter().enumerate() {
            sorted.values[dst] = self.values[src];
            for r in 0..N {
                sorted.vectors[r][dst] = self.vectors[r][src];
            }
        }
        sorted
    }
}

/// Diagonalize a symmetric matrix.
///
/// Only the diagonal and upper triangle are read. Each sweep rotates every
/// off-diagonal pair `(p, q)` to zero; the loop ends when the off-diagonal
/// sum is exactly zero. Running out of sweeps returns
/// [`Error::NoConvergence`].
pub fn diagonalize(matrix: &[[f64; 3]; 3]) -> Result<SymmetricEigen> {
    let mut a = *matrix;
    let mut q = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut w = [a[0][0], a[1][1], a[2][2]];

    for sweep in 0..JACOBI_MAX_SWEEPS {
        let off = a[0][1].abs() + a[0][2].abs() + a[1][2].abs();
        if off == 0.0 {
            trace!("jacobi converged after {} sweeps", sweep);
            return Ok(SymmetricEigen {
                values: w,
                vectors: q,
            });
        }

        // Skip small rotations during the first sweeps.
        let thresh = if sweep < 4 {
            0.2 * off / (N * N) as f64
        } else {
            0.0
        };

        for p in 0..N {
            for r in p + 1..N {
                let apr = a[p][r];
                let g = 100.0 * apr.abs();

                // Off-diagonal too small to change either diagonal entry.
                if sweep > 4 && w[p].abs() + g == w[p].abs() && w[r].abs() + g == w[r].abs() {
                    a[p][r] = 0.0;
                } else if apr.abs() > thresh {
                    rotate(&mut a, &mut q, &mut w, p, r, g);
                }
            }
        }
    }

    Err(Error::NoConvergence {
        sweeps: JACOBI_MAX_SWEEPS,
    })
}

/// Apply the Jacobi rotation that zeroes `a[p][r]`.
fn rotate(
    a: &mut [[f64; 3]; 3],
    q: &mut [[f64; 3]; 3],
    w: &mut [f64; 3],
    p: usize,
    r: usize,
    g: f64,
) {
    let apr = a[p][r];
    let h = w[r] - w[p];
    let t = if h.abs() + g == h.abs() {
        apr / h
    } else {
        let theta = 0.5 * h / apr;
        let t = 1.0 / (theta.abs() + (1.0 + theta * theta).sqrt());
        if theta < 0.0 {
            -t
        } else {
            t
        }
    };
    let c = 1.0 / (1.0 + t * t).sqrt();
    let s = t * c;
    let z = t * apr;

    a[p][r] = 0.0;
    w[p] -= z;
    w[r] += z;

    for k in 0..p {
        let t = a[k][p];
        a[k][p] = c * t - s * a[k][r];
        a[k][r] = s * t + c * a[k][r];
    }
    for k in p + 1..r {
        let t = a[p][k];
        a[p][k] = c * t - s * a[k][r];
        a[k][r] = s * t + c * a[k][r];
    }
    for k in r + 1..N {
        let t = a[p][k];
        a[p][k] = c * t - s * a[r][k];
        a[r][k] = s * t + c * a[r][k];
    }

    for row in q.iter_mut() {
        let t = row[p];
        row[p] = c * t - s * row[r];
        row[r] = s * t + c * row[r];
    }
}
