// src/operator.rs
//
// Assembly of the discrete Dirichlet problem L_h u_h = f_h on Omega.
//
// For every interior point k (in Omega order):
//   1. resolve per-direction step sizes h_d and boundary values v_d,
//   2. f_h[k] = source(x, y) - Σ_d v_d / h_d²,
//   3. scale every neighbour entry of the pattern row by 1/h_d² of *its* direction,
//      where the direction comes from the explicit neighbour map, never from index
//      arithmetic,
//   4. scale the diagonal according to `DiagonalConvention`.
//
// The row lists are mutated in place and then frozen into a CSR matrix. Nothing
// touches the operator after that.

use serde::Serialize;
use sprs::{CsMat, TriMat};

use crate::boundary::{self, BoundaryValue};
use crate::error::{PoissonError, Result};
use crate::geometry_mask::{self, GridPoint};
use crate::grid::{DiamondGrid, Direction};
use crate::stencil::{self, Neighbours, RowTable};

/// How the diagonal entry -4 is scaled.
///
/// The off-diagonal and right-hand-side terms always carry 1/h_d². `Scaled` divides the
/// diagonal by h² as well, giving the standard five-point Laplacian -4/h² in rows far
/// from the boundary. `Unscaled` leaves it at -4, which only agrees with the Laplacian
/// when h = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DiagonalConvention {
    #[default]
    Scaled,
    Unscaled,
}

impl DiagonalConvention {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scaled" | "h2" | "standard" => Some(Self::Scaled),
            "unscaled" | "raw" => Some(Self::Unscaled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scaled => "scaled",
            Self::Unscaled => "unscaled",
        }
    }

    #[inline]
    fn diagonal(&self, placeholder: f64, h: f64) -> f64 {
        match self {
            Self::Scaled => placeholder / (h * h),
            Self::Unscaled => placeholder,
        }
    }
}

/// Assembled system on Omega.
#[derive(Debug, Clone)]
pub struct DiscreteSystem {
    pub grid: DiamondGrid,
    /// Unknowns, in row order of `operator`.
    pub omega: Vec<GridPoint>,
    pub neighbours: Vec<Neighbours>,
    /// L_h in CSR form.
    pub operator: CsMat<f64>,
    /// f_h.
    pub rhs: Vec<f64>,
}

impl DiscreteSystem {
    pub fn dim(&self) -> usize {
        self.omega.len()
    }

    /// L_h[row, col], zero outside the pattern.
    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.operator.get(row, col).copied().unwrap_or(0.0)
    }

    /// Number of rows that needed at least one boundary correction.
    pub fn boundary_rows(&self) -> usize {
        self.neighbours
            .iter()
            .filter(|nb| nb.0.iter().any(Option::is_none))
            .count()
    }
}

/// Direction in which `col` neighbours the point with adjacency `nb`.
fn direction_of(nb: &Neighbours, col: usize) -> Option<Direction> {
    nb.iter()
        .find(|&(_, n)| n == Some(col))
        .map(|(d, _)| d)
}

/// Assemble L_h and f_h for Laplace's equation with Dirichlet data `bc`.
pub fn assemble<B>(
    grid: &DiamondGrid,
    bc: &B,
    convention: DiagonalConvention,
) -> Result<DiscreteSystem>
where
    B: BoundaryValue + ?Sized,
{
    assemble_with_source(grid, bc, &|_: f64, _: f64| 0.0, convention)
}

/// Assemble L_h and f_h for Δu = source with Dirichlet data `bc`.
pub fn assemble_with_source<B, S>(
    grid: &DiamondGrid,
    bc: &B,
    source: &S,
    convention: DiagonalConvention,
) -> Result<DiscreteSystem>
where
    B: BoundaryValue + ?Sized,
    S: Fn(f64, f64) -> f64 + ?Sized,
{
    let h = grid.h;
    let omega = geometry_mask::interior_points(grid);
    let table = RowTable::from_points(&omega)?;
    let mut pattern = stencil::build_pattern(&table);

    if pattern.dim() != omega.len() || omega.len() != grid.interior_count() {
        return Err(PoissonError::SizeMismatch {
            pattern: pattern.dim(),
            omega: omega.len(),
        });
    }

    let n = omega.len();
    let mut rhs = vec![0.0; n];

    for (k, p) in omega.iter().enumerate() {
        let corr = boundary::resolve(p.x, p.y, h, bc);
        let nb = &pattern.neighbours[k];

        // A direction is either an unknown or a boundary crossing, never both or neither.
        for d in Direction::ALL {
            if nb[d].is_some() == corr.crossings[d].is_some() {
                return Err(PoissonError::NeighbourMismatch { row: k, direction: d });
            }
        }

        rhs[k] = source(p.x, p.y) + corr.rhs_contribution();

        for (col, coeff) in pattern.rows[k].iter_mut() {
            if *col == k {
                *coeff = convention.diagonal(*coeff, h);
                continue;
            }
            let d = direction_of(nb, *col)
                .ok_or(PoissonError::StencilMismatch { row: k, col: *col })?;
            let hd = corr.steps[d];
            *coeff /= hd * hd;
        }
    }

    let mut tri = TriMat::with_capacity((n, n), pattern.nnz());
    for (r, row) in pattern.rows.iter().enumerate() {
        for &(c, v) in row {
            tri.add_triplet(r, c, v);
        }
    }
    let operator: CsMat<f64> = tri.to_csr();

    log::debug!(
        "assembled N={} (h={:.4e}): {} unknowns, {} nonzeros, diagonal {}",
        grid.n,
        h,
        n,
        operator.nnz(),
        convention.as_str()
    );

    Ok(DiscreteSystem {
        grid: *grid,
        omega,
        neighbours: pattern.neighbours,
        operator,
        rhs,
    })
}
