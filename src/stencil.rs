// src/stencil.rs
//
// Structural five-point pattern over Omega.
//
// Omega is scanned row by row (j ascending), and the rows of the diamond have varying
// widths, so the flat index offset of a north/south neighbour changes from row to row.
// Rather than reconstructing row boundaries from closed-form sums, the row table is read
// off the classified points themselves (start offset and width of every row j), and the
// neighbour map is built by lattice lookups into that table:
//
//   west/east   : k ∓ 1, but only inside the same row (no coupling across row seams)
//   south/north : index of (i, j ∓ 1) in the adjacent row, if that row covers i
//
// The pattern carries placeholder coefficients (-4 on the diagonal, 1 per neighbour);
// the operator builder scales them in place.

use crate::error::{PoissonError, Result};
use crate::geometry_mask::GridPoint;
use crate::grid::{Direction, PerDirection};

/// Diagonal coefficient before scaling.
pub const DIAGONAL_PLACEHOLDER: f64 = -4.0;
/// Neighbour coefficient before scaling.
pub const NEIGHBOUR_PLACEHOLDER: f64 = 1.0;

/// Contiguous run of Omega points on lattice row `j`: i in [i_min, i_min + len).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub j: i64,
    pub i_min: i64,
    pub len: usize,
    /// Flat index of the first point of the row.
    pub start: usize,
}

impl RowSpan {
    #[inline]
    pub fn i_max(&self) -> i64 {
        self.i_min + self.len as i64 - 1
    }

    /// Flat index of lattice column `i` on this row.
    #[inline]
    pub fn index_of(&self, i: i64) -> Option<usize> {
        if i < self.i_min || i > self.i_max() {
            return None;
        }
        Some(self.start + (i - self.i_min) as usize)
    }
}

/// Row-width table of Omega, rows in ascending j.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTable {
    rows: Vec<RowSpan>,
    total: usize,
}

impl RowTable {
    /// Group ordered Omega points by row. Points must be in (j, i) order with each row a
    /// contiguous run of i.
    pub fn from_points(points: &[GridPoint]) -> Result<Self> {
        let mut rows: Vec<RowSpan> = Vec::new();

        for (k, p) in points.iter().enumerate() {
            if let Some(row) = rows.last_mut() {
                if row.j == p.j {
                    if p.i != row.i_min + row.len as i64 {
                        return Err(PoissonError::NonContiguousRow { j: p.j });
                    }
                    row.len += 1;
                    continue;
                }
                if p.j < row.j {
                    return Err(PoissonError::NonContiguousRow { j: p.j });
                }
            }
            rows.push(RowSpan {
                j: p.j,
                i_min: p.i,
                len: 1,
                start: k,
            });
        }

        Ok(Self {
            rows,
            total: points.len(),
        })
    }

    pub fn rows(&self) -> &[RowSpan] {
        &self.rows
    }

    /// Number of points covered by the table.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn row(&self, j: i64) -> Option<&RowSpan> {
        self.rows
            .binary_search_by_key(&j, |r| r.j)
            .ok()
            .map(|k| &self.rows[k])
    }

    /// Flat index of lattice point (i, j), if it belongs to Omega.
    pub fn index_of(&self, i: i64, j: i64) -> Option<usize> {
        self.row(j).and_then(|r| r.index_of(i))
    }
}

/// Explicit adjacency of one Omega point: flat index of each neighbour, or `None` if the
/// neighbour is not an unknown.
pub type Neighbours = PerDirection<Option<usize>>;

/// Row-list (LIL) sparse pattern plus the neighbour map it was built from.
#[derive(Debug, Clone, Default)]
pub struct StencilPattern {
    pub neighbours: Vec<Neighbours>,
    /// Per-row `(col, coeff)` entries, sorted by column.
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl StencilPattern {
    /// Number of rows (= columns).
    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Neighbour map for every point of the table, in flat order.
pub fn neighbour_map(table: &RowTable) -> Vec<Neighbours> {
    let mut out = Vec::with_capacity(table.len());
    for row in table.rows() {
        for k in 0..row.len {
            let i = row.i_min + k as i64;
            out.push(PerDirection::from_fn(|d| {
                let (di, dj) = d.offset();
                if dj == 0 {
                    row.index_of(i + di)
                } else {
                    table.index_of(i, row.j + dj)
                }
            }));
        }
    }
    out
}

/// Build the five-band pattern for Omega.
pub fn build_pattern(table: &RowTable) -> StencilPattern {
    let neighbours = neighbour_map(table);
    let rows = neighbours
        .iter()
        .enumerate()
        .map(|(k, nb)| {
            // S < W < k < E < N in flat order, so this push order is already sorted.
            let mut row = Vec::with_capacity(5);
            for d in [Direction::South, Direction::West] {
                if let Some(col) = nb[d] {
                    row.push((col, NEIGHBOUR_PLACEHOLDER));
                }
            }
            row.push((k, DIAGONAL_PLACEHOLDER));
            for d in [Direction::East, Direction::North] {
                if let Some(col) = nb[d] {
                    row.push((col, NEIGHBOUR_PLACEHOLDER));
                }
            }
            row
        })
        .collect();

    let pattern = StencilPattern { neighbours, rows };
    log::debug!(
        "stencil pattern: {} rows in {} lattice rows, {} nonzeros",
        pattern.dim(),
        table.rows().len(),
        pattern.nnz()
    );
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_mask::interior_points;
    use crate::grid::DiamondGrid;

    fn table_for(n: usize) -> RowTable {
        let g = DiamondGrid::new(n).unwrap();
        RowTable::from_points(&interior_points(&g)).unwrap()
    }

    #[test]
    fn row_widths_grow_then_shrink() {
        let n = 5usize;
        let t = table_for(n);
        let widths: Vec<usize> = t.rows().iter().map(|r| r.len).collect();
        assert_eq!(widths, vec![1, 3, 5, 7, 9, 11, 9, 7, 5, 3, 1]);
        for r in t.rows() {
            assert_eq!(r.len, 2 * (n - r.j.unsigned_abs() as usize) + 1);
            assert_eq!(r.i_min, -(r.i_max()));
        }
        assert_eq!(t.len(), 61);
        assert_eq!(t.rows()[3].start, 1 + 3 + 5);
    }

    #[test]
    fn no_horizontal_coupling_across_row_seams() {
        let t = table_for(7);
        let p = build_pattern(&t);
        for r in t.rows() {
            let first = r.start;
            let last = r.start + r.len - 1;
            assert_eq!(p.neighbours[first][Direction::West], None);
            assert_eq!(p.neighbours[last][Direction::East], None);
            if first > 0 {
                // consecutive in flat order, but not adjacent
                assert!(!p.rows[first].iter().any(|&(c, _)| c == first - 1));
                assert!(!p.rows[first - 1].iter().any(|&(c, _)| c == first));
            }
        }
    }

    #[test]
    fn vertical_offset_follows_row_widths() {
        let t = table_for(9);
        let p = build_pattern(&t);
        for pair in t.rows().windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            let offset = (lo.len + hi.len) / 2;
            for k in 0..lo.len {
                let i = lo.i_min + k as i64;
                let idx = lo.start + k;
                match p.neighbours[idx][Direction::North] {
                    Some(up) => {
                        assert_eq!(up, idx + offset);
                        assert_eq!(p.neighbours[up][Direction::South], Some(idx));
                    }
                    None => assert!(hi.index_of(i).is_none()),
                }
            }
        }
    }

    #[test]
    fn rows_are_sorted_and_banded() {
        let t = table_for(5);
        let p = build_pattern(&t);
        assert_eq!(p.dim(), t.len());
        for (k, row) in p.rows.iter().enumerate() {
            assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
            assert!(row.len() <= 5);
            let diag: Vec<_> = row.iter().filter(|&&(c, _)| c == k).collect();
            assert_eq!(diag.len(), 1);
            assert_eq!(diag[0].1, DIAGONAL_PLACEHOLDER);
        }
        // Pattern is structurally symmetric.
        for (k, row) in p.rows.iter().enumerate() {
            for &(c, _) in row {
                assert!(p.rows[c].iter().any(|&(cc, _)| cc == k));
            }
        }
    }

    #[test]
    fn rejects_out_of_order_points() {
        let pts = [
            GridPoint { i: 0, j: 0, x: 0.0, y: 0.0 },
            GridPoint { i: 2, j: 0, x: 0.5, y: 0.0 },
        ];
        assert_eq!(
            RowTable::from_points(&pts),
            Err(PoissonError::NonContiguousRow { j: 0 })
        );
    }
}
