// src/error.rs
//
// Error taxonomy for the discretisation and solve:
// - configuration errors (bad resolution) fail before anything is allocated,
// - internal-consistency errors mean the assembler disagrees with the classifier,
// - numerical errors come out of the sparse solve and are passed through unchanged.
//
// Rendering failures are not in here: plotting returns a boxed error
// and callers log it and carry on.

use thiserror::Error;

use crate::grid::Direction;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PoissonError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoissonError {
    /// Grid resolution must be a positive odd integer.
    #[error("grid resolution N={n} is invalid: N must be a positive odd integer")]
    InvalidResolution { n: usize },

    /// Stencil pattern and classified interior point set have different sizes.
    #[error("stencil pattern has {pattern} rows but {omega} interior points were classified")]
    SizeMismatch { pattern: usize, omega: usize },

    /// Omega points of one lattice row are not a contiguous run of i, or rows are out of order.
    #[error("interior points of row j={j} are not a contiguous, ordered run")]
    NonContiguousRow { j: i64 },

    /// A nonzero in row `row` that is neither the diagonal nor one of the four neighbours.
    #[error("row {row} has an unexpected nonzero in column {col}")]
    StencilMismatch { row: usize, col: usize },

    /// The neighbour map and the boundary resolver disagree about whether the
    /// neighbour of `row` in `direction` is an unknown or a boundary crossing.
    #[error("row {row}: neighbour map and boundary resolver disagree in direction {direction:?}")]
    NeighbourMismatch { row: usize, direction: Direction },

    #[error("system is {rows}x{cols} but right-hand side has length {rhs}")]
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },

    /// Empty row or zero diagonal entry: the operator is structurally singular.
    #[error("operator is singular (row {row} has no usable diagonal)")]
    SingularMatrix { row: usize },

    #[error("BiCGSTAB broke down at iteration {iteration}")]
    Breakdown { iteration: usize },

    #[error("solver did not converge in {iterations} iterations (residual {residual:.3e})")]
    NoConvergence { iterations: usize, residual: f64 },
}
