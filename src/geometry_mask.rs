// src/geometry_mask.rs
//
// Classification of background-grid points against the diamond.
//
// Scan order is row-major with j outer and i inner, both ascending. With `strict = true`
// the scan yields exactly the unknowns of the linear system (Omega) in the order the
// operator rows are numbered; with `strict = false` boundary points are included too,
// which is only useful for plotting.
//
// Labels are diagnostic only; the assembler never looks at them.

use serde::Serialize;

use crate::grid::{self, DiamondGrid, Direction};

/// Diagnostic label for an included grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointClass {
    /// All four axis neighbours are strictly inside.
    Interior,
    /// Not on the boundary, but at least one axis neighbour is on or beyond it.
    NearBoundary,
    /// |x|+|y| = 1 within tolerance.
    OnBoundary,
}

impl PointClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PointClass::Interior => "interior",
            PointClass::NearBoundary => "near-boundary",
            PointClass::OnBoundary => "on-boundary",
        }
    }
}

/// A background-grid point: lattice offsets and physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub i: i64,
    pub j: i64,
    pub x: f64,
    pub y: f64,
}

/// Ordered points with one label each (same length, same order).
#[derive(Debug, Clone, Default)]
pub struct ClassifiedPoints {
    pub points: Vec<GridPoint>,
    pub labels: Vec<PointClass>,
}

impl ClassifiedPoints {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points carrying `class`.
    pub fn count(&self, class: PointClass) -> usize {
        self.labels.iter().filter(|&&c| c == class).count()
    }
}

/// True if (x, y) is not itself on the boundary and one of its axis neighbours at
/// distance `h` is on or beyond the boundary.
pub fn close_to_boundary(x: f64, y: f64, h: f64) -> bool {
    if grid::on_boundary(x, y) {
        return false;
    }
    Direction::ALL.iter().any(|&d| {
        let (di, dj) = d.offset();
        grid::not_strictly_inside(x + h * di as f64, y + h * dj as f64)
    })
}

/// Label an included point.
pub fn classify_point(x: f64, y: f64, h: f64) -> PointClass {
    if close_to_boundary(x, y, h) {
        PointClass::NearBoundary
    } else if grid::on_boundary(x, y) {
        PointClass::OnBoundary
    } else {
        PointClass::Interior
    }
}

/// Enumerate and label grid points in (j, i) lexicographic order.
///
/// `strict = true` keeps only points strictly inside the diamond (Omega);
/// `strict = false` keeps the closed diamond.
pub fn enumerate(grid: &DiamondGrid, strict: bool) -> ClassifiedPoints {
    let capacity = if strict {
        grid.interior_count()
    } else {
        grid.closure_count()
    };
    let mut out = ClassifiedPoints {
        points: Vec::with_capacity(capacity),
        labels: Vec::with_capacity(capacity),
    };

    for j in grid.lattice_range() {
        for i in grid.lattice_range() {
            let (x, y) = grid.coords(i, j);
            let included = if strict {
                grid::strictly_inside(x, y)
            } else {
                grid::inside(x, y)
            };
            if !included {
                continue;
            }
            out.points.push(GridPoint { i, j, x, y });
            out.labels.push(classify_point(x, y, grid.h));
        }
    }

    log::debug!(
        "classified {} points (N={}, strict={}): {} interior, {} near-boundary, {} on-boundary",
        out.len(),
        grid.n,
        strict,
        out.count(PointClass::Interior),
        out.count(PointClass::NearBoundary),
        out.count(PointClass::OnBoundary),
    );
    out
}

/// Omega: the strictly interior points, in operator row order.
pub fn interior_points(grid: &DiamondGrid) -> Vec<GridPoint> {
    enumerate(grid, true).points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_grid_has_origin_and_four_neighbours() {
        let g = DiamondGrid::new(1).unwrap();
        let c = enumerate(&g, true);
        let ij: Vec<(i64, i64)> = c.points.iter().map(|p| (p.i, p.j)).collect();
        assert_eq!(ij, vec![(0, -1), (-1, 0), (0, 0), (1, 0), (0, 1)]);

        // Only the origin is far from the boundary.
        assert_eq!(c.count(PointClass::Interior), 1);
        assert_eq!(c.labels[2], PointClass::Interior);
        for k in [0, 1, 3, 4] {
            assert_eq!(c.labels[k], PointClass::NearBoundary);
        }
    }

    #[test]
    fn boundary_point_is_not_near_boundary() {
        assert!(!close_to_boundary(1.0, 0.0, 0.5));
        assert!(close_to_boundary(0.5, 0.0, 0.5));
        assert!(!close_to_boundary(0.0, 0.0, 0.25));
        assert_eq!(classify_point(0.5, 0.5, 0.5), PointClass::OnBoundary);
    }

    #[test]
    fn scan_order_is_row_major_by_j_then_i() {
        let g = DiamondGrid::new(5).unwrap();
        let pts = interior_points(&g);
        for w in pts.windows(2) {
            assert!((w[0].j, w[0].i) < (w[1].j, w[1].i));
        }
    }

    #[test]
    fn counts_match_closed_form() {
        for n in [1usize, 3, 5, 7, 11, 21] {
            let g = DiamondGrid::new(n).unwrap();
            assert_eq!(enumerate(&g, true).len(), g.interior_count(), "N={n}");
            assert_eq!(enumerate(&g, false).len(), g.closure_count(), "N={n}");
        }
    }
}
