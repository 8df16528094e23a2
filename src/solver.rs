// src/solver.rs
//
// Sparse linear solve for the assembled operator.
//
// L_h is not symmetric once boundary rows carry per-direction step sizes, so plain CG
// is not an option; this is Jacobi-preconditioned BiCGSTAB over the CSR matrix.
//
// Failure is explicit:
//   - empty row / zero diagonal       -> SingularMatrix (checked before iterating)
//   - ρ, <r̂, v>, |t|² or ω vanishing  -> Breakdown
//   - iteration budget exhausted      -> NoConvergence
//
// Env overrides (read by `SolverConfig::from_env`):
//   DIAMOND_SOLVER_MAX_ITERS=<n>
//   DIAMOND_SOLVER_RTOL=<f64>
//   DIAMOND_SOLVER_ATOL=<f64>

use serde::Serialize;
use sprs::CsMat;

use crate::error::{PoissonError, Result};

const TINY: f64 = 1e-300;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Stop when ‖r‖ <= max(abs_tolerance, rel_tolerance * ‖b‖).
    pub rel_tolerance: f64,
    pub abs_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            rel_tolerance: 1e-12,
            abs_tolerance: 1e-14,
        }
    }
}

impl SolverConfig {
    pub fn from_env() -> Self {
        fn get_usize(name: &str) -> Option<usize> {
            std::env::var(name)
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok())
        }
        fn get_f64(name: &str) -> Option<f64> {
            std::env::var(name)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
        }

        let mut cfg = Self::default();
        if let Some(v) = get_usize("DIAMOND_SOLVER_MAX_ITERS") {
            cfg.max_iterations = v.max(1);
        }
        if let Some(v) = get_f64("DIAMOND_SOLVER_RTOL") {
            if v > 0.0 {
                cfg.rel_tolerance = v;
            }
        }
        if let Some(v) = get_f64("DIAMOND_SOLVER_ATOL") {
            if v >= 0.0 {
                cfg.abs_tolerance = v;
            }
        }
        cfg
    }
}

/// Converged solution plus solver statistics.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub x: Vec<f64>,
    pub iterations: usize,
    /// Final ‖b - A x‖₂.
    pub residual: f64,
}

/// y = A x for a CSR matrix.
pub fn mul_vec(a: &CsMat<f64>, x: &[f64], y: &mut [f64]) {
    for (r, row) in a.outer_iterator().enumerate() {
        y[r] = row.iter().map(|(c, &v)| v * x[c]).sum();
    }
}

/// ‖b - A x‖₂.
pub fn residual_norm(a: &CsMat<f64>, x: &[f64], b: &[f64]) -> f64 {
    let mut ax = vec![0.0; b.len()];
    mul_vec(a, x, &mut ax);
    ax.iter()
        .zip(b)
        .map(|(p, q)| (q - p) * (q - p))
        .sum::<f64>()
        .sqrt()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
fn vanishes(v: f64) -> bool {
    !v.is_finite() || v.abs() < TINY
}

/// Inverse diagonal, failing on an empty row or a zero diagonal entry.
fn inverse_diagonal(a: &CsMat<f64>) -> Result<Vec<f64>> {
    let n = a.rows();
    let mut inv = Vec::with_capacity(n);
    for r in 0..n {
        match a.get(r, r) {
            Some(&d) if d != 0.0 && d.is_finite() => inv.push(1.0 / d),
            _ => return Err(PoissonError::SingularMatrix { row: r }),
        }
    }
    Ok(inv)
}

/// Solve A x = b with Jacobi-preconditioned BiCGSTAB, starting from x = 0.
pub fn solve(a: &CsMat<f64>, b: &[f64], config: &SolverConfig) -> Result<SolveOutcome> {
    if a.rows() != a.cols() || a.rows() != b.len() {
        return Err(PoissonError::DimensionMismatch {
            rows: a.rows(),
            cols: a.cols(),
            rhs: b.len(),
        });
    }

    let csr;
    let a = if a.is_csr() {
        a
    } else {
        csr = a.to_csr();
        &csr
    };

    let n = b.len();
    if n == 0 {
        return Ok(SolveOutcome {
            x: Vec::new(),
            iterations: 0,
            residual: 0.0,
        });
    }

    let inv_diag = inverse_diagonal(a)?;

    let b_norm = l2_norm(b);
    let tol = config.abs_tolerance.max(config.rel_tolerance * b_norm);

    let mut x = vec![0.0; n];
    let mut r = b.to_vec();
    if l2_norm(&r) <= tol {
        return Ok(SolveOutcome {
            x,
            iterations: 0,
            residual: l2_norm(&r),
        });
    }
    let r_hat = r.clone();

    let mut p = vec![0.0; n];
    let mut v = vec![0.0; n];
    let mut y = vec![0.0; n];
    let mut s = vec![0.0; n];
    let mut z = vec![0.0; n];
    let mut t = vec![0.0; n];

    let mut rho_old = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;

    for it in 1..=config.max_iterations {
        let rho = dot(&r_hat, &r);
        if vanishes(rho) {
            return Err(PoissonError::Breakdown { iteration: it });
        }

        if it == 1 {
            p.copy_from_slice(&r);
        } else {
            let beta = (rho / rho_old) * (alpha / omega);
            for i in 0..n {
                p[i] = r[i] + beta * (p[i] - omega * v[i]);
            }
        }

        for i in 0..n {
            y[i] = inv_diag[i] * p[i];
        }
        mul_vec(a, &y, &mut v);

        let denom = dot(&r_hat, &v);
        if vanishes(denom) {
            return Err(PoissonError::Breakdown { iteration: it });
        }
        alpha = rho / denom;

        for i in 0..n {
            s[i] = r[i] - alpha * v[i];
        }
        if l2_norm(&s) <= tol {
            for i in 0..n {
                x[i] += alpha * y[i];
            }
            return Ok(finish(a, x, b, it));
        }

        for i in 0..n {
            z[i] = inv_diag[i] * s[i];
        }
        mul_vec(a, &z, &mut t);

        let tt = dot(&t, &t);
        if vanishes(tt) {
            return Err(PoissonError::Breakdown { iteration: it });
        }
        omega = dot(&t, &s) / tt;

        for i in 0..n {
            x[i] += alpha * y[i] + omega * z[i];
            r[i] = s[i] - omega * t[i];
        }
        if l2_norm(&r) <= tol {
            return Ok(finish(a, x, b, it));
        }
        if vanishes(omega) {
            return Err(PoissonError::Breakdown { iteration: it });
        }
        rho_old = rho;
    }

    Err(PoissonError::NoConvergence {
        iterations: config.max_iterations,
        residual: l2_norm(&r),
    })
}

fn finish(a: &CsMat<f64>, x: Vec<f64>, b: &[f64], iterations: usize) -> SolveOutcome {
    let residual = residual_norm(a, &x, b);
    log::debug!("BiCGSTAB converged in {iterations} iterations, residual {residual:.3e}");
    SolveOutcome {
        x,
        iterations,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    fn csr(n: usize, entries: &[(usize, usize, f64)]) -> CsMat<f64> {
        let mut tri = TriMat::new((n, n));
        for &(r, c, v) in entries {
            tri.add_triplet(r, c, v);
        }
        tri.to_csr()
    }

    #[test]
    fn solves_nonsymmetric_system() {
        // [ 4 -1  0 ] [x]   [ 2 ]
        // [-2  5 -1 ] [y] = [ 2 ]
        // [ 0 -3  6 ] [z]   [ 3 ]
        let a = csr(
            3,
            &[
                (0, 0, 4.0),
                (0, 1, -1.0),
                (1, 0, -2.0),
                (1, 1, 5.0),
                (1, 2, -1.0),
                (2, 1, -3.0),
                (2, 2, 6.0),
            ],
        );
        let b = [2.0, 2.0, 3.0];
        let out = solve(&a, &b, &SolverConfig::default()).unwrap();
        assert!(out.residual < 1e-10, "residual={}", out.residual);
        let mut ax = [0.0; 3];
        mul_vec(&a, &out.x, &mut ax);
        for (p, q) in ax.iter().zip(&b) {
            assert!((p - q).abs() < 1e-10);
        }
    }

    #[test]
    fn zero_rhs_gives_zero_solution() {
        let a = csr(2, &[(0, 0, -2.0), (1, 1, -2.0), (0, 1, 1.0), (1, 0, 1.0)]);
        let out = solve(&a, &[0.0, 0.0], &SolverConfig::default()).unwrap();
        assert_eq!(out.x, vec![0.0, 0.0]);
        assert_eq!(out.iterations, 0);
    }

    #[test]
    fn zero_diagonal_is_singular() {
        let a = csr(2, &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0)]);
        assert_eq!(
            solve(&a, &[1.0, 1.0], &SolverConfig::default()).unwrap_err(),
            PoissonError::SingularMatrix { row: 1 }
        );
    }

    #[test]
    fn rank_deficient_matrix_fails_explicitly() {
        let a = csr(2, &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 1.0)]);
        let err = solve(&a, &[1.0, 0.0], &SolverConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PoissonError::Breakdown { .. } | PoissonError::NoConvergence { .. }
        ));
    }

    #[test]
    fn rhs_length_is_checked() {
        let a = csr(2, &[(0, 0, 1.0), (1, 1, 1.0)]);
        assert_eq!(
            solve(&a, &[1.0], &SolverConfig::default()).unwrap_err(),
            PoissonError::DimensionMismatch {
                rows: 2,
                cols: 2,
                rhs: 1
            }
        );
    }
}
