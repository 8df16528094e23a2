// src/problem.rs
//
// End-to-end driver: classify -> assemble -> solve.

use crate::boundary::BoundaryValue;
use crate::error::Result;
use crate::geometry_mask::GridPoint;
use crate::grid::DiamondGrid;
use crate::operator::{self, DiagonalConvention, DiscreteSystem};
use crate::solver::{self, SolverConfig};

/// Solved system: u[k] is the value at `system.omega[k]`.
#[derive(Debug, Clone)]
pub struct Solution {
    pub system: DiscreteSystem,
    pub u: Vec<f64>,
    pub iterations: usize,
    /// ‖L_h u - f_h‖₂.
    pub residual_norm: f64,
}

impl Solution {
    /// Solve an assembled system. Solver errors are passed through unchanged.
    pub fn solve(system: DiscreteSystem, config: &SolverConfig) -> Result<Self> {
        let out = solver::solve(&system.operator, &system.rhs, config)?;
        log::info!(
            "solved N={} ({} unknowns) in {} iterations, residual {:.3e}",
            system.grid.n,
            system.dim(),
            out.iterations,
            out.residual
        );
        Ok(Self {
            system,
            u: out.x,
            iterations: out.iterations,
            residual_norm: out.residual,
        })
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.system.omega
    }

    /// Value at lattice point (i, j), if it is an unknown.
    pub fn value_at(&self, i: i64, j: i64) -> Option<f64> {
        self.system
            .omega
            .iter()
            .position(|p| p.i == i && p.j == j)
            .map(|k| self.u[k])
    }

    /// max_k |u[k] - exact(x_k, y_k)|.
    pub fn max_error<F: Fn(f64, f64) -> f64>(&self, exact: F) -> f64 {
        self.system
            .omega
            .iter()
            .zip(&self.u)
            .map(|(p, &u)| (u - exact(p.x, p.y)).abs())
            .fold(0.0, f64::max)
    }
}

/// Laplace's equation Δu = 0 on the diamond with Dirichlet data `bc`.
pub fn solve_laplace<B>(
    grid: &DiamondGrid,
    bc: &B,
    convention: DiagonalConvention,
    config: &SolverConfig,
) -> Result<Solution>
where
    B: BoundaryValue + ?Sized,
{
    let system = operator::assemble(grid, bc, convention)?;
    Solution::solve(system, config)
}

/// Poisson's equation Δu = source on the diamond with Dirichlet data `bc`.
pub fn solve_poisson<B, S>(
    grid: &DiamondGrid,
    bc: &B,
    source: &S,
    convention: DiagonalConvention,
    config: &SolverConfig,
) -> Result<Solution>
where
    B: BoundaryValue + ?Sized,
    S: Fn(f64, f64) -> f64 + ?Sized,
{
    let system = operator::assemble_with_source(grid, bc, source, convention)?;
    Solution::solve(system, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryData;

    #[test]
    fn smallest_grid_hand_solution() {
        // Tent data on N=1: by symmetry u(±½,0)=a, u(0,±½)=b, u(0,0)=c with
        //   -16c + 8a + 8b = 0,  4c - 16a = -4,  4c - 16b = -8
        // => c = 1/2, a = 3/8, b = 5/8.
        let g = DiamondGrid::new(1).unwrap();
        let sol = solve_laplace(
            &g,
            &BoundaryData::Tent,
            DiagonalConvention::Scaled,
            &SolverConfig::default(),
        )
        .unwrap();
        let tol = 1e-8;
        assert!((sol.value_at(0, 0).unwrap() - 0.5).abs() < tol);
        assert!((sol.value_at(1, 0).unwrap() - 0.375).abs() < tol);
        assert!((sol.value_at(-1, 0).unwrap() - 0.375).abs() < tol);
        assert!((sol.value_at(0, 1).unwrap() - 0.625).abs() < tol);
        assert!((sol.value_at(0, -1).unwrap() - 0.625).abs() < tol);
        assert_eq!(sol.value_at(1, 1), None);
    }

    #[test]
    fn even_resolution_is_rejected_before_assembly() {
        assert!(DiamondGrid::new(10).is_err());
    }
}
