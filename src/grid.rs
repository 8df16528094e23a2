// src/grid.rs
//
// Uniform background grid for the diamond |x|+|y| <= 1.
//
// Lattice points are (i, j) with i, j in [-(N+1), N+1] and coordinates (h*i, h*j),
// h = 1/(N+1). With this choice the four corners (±1, 0), (0, ±1) are lattice points
// and every edge of the diamond passes through lattice points.

use std::ops::{Index, IndexMut, RangeInclusive};

use crate::error::{PoissonError, Result};

/// Tolerance used by every domain predicate.
pub const EPS: f64 = 1e-10;

/// Background grid of resolution N (odd) and step h = 1/(N+1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiamondGrid {
    pub n: usize,
    pub h: f64,
}

impl DiamondGrid {
    /// Create a grid of resolution `n`. Fails unless `n` is a positive odd integer.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 || n % 2 == 0 {
            return Err(PoissonError::InvalidResolution { n });
        }
        Ok(Self {
            n,
            h: 1.0 / (n as f64 + 1.0),
        })
    }

    /// Largest lattice offset, N+1.
    #[inline]
    pub fn extent(&self) -> i64 {
        self.n as i64 + 1
    }

    /// Lattice offsets scanned in each axis: -(N+1)..=N+1.
    #[inline]
    pub fn lattice_range(&self) -> RangeInclusive<i64> {
        -self.extent()..=self.extent()
    }

    /// Physical coordinates of lattice point (i, j).
    #[inline]
    pub fn coords(&self, i: i64, j: i64) -> (f64, f64) {
        (self.h * i as f64, self.h * j as f64)
    }

    /// Closed-form |Omega|: lattice points with |i|+|j| <= N.
    pub fn interior_count(&self) -> usize {
        let n = self.n;
        2 * n * n + 2 * n + 1
    }

    /// Closed-form size of interior ∪ boundary: |i|+|j| <= N+1.
    pub fn closure_count(&self) -> usize {
        let m = self.n + 1;
        2 * m * m + 2 * m + 1
    }
}

#[inline]
fn l1(x: f64, y: f64) -> f64 {
    x.abs() + y.abs()
}

/// Closed diamond: |x|+|y| <= 1+ε.
#[inline]
pub fn inside(x: f64, y: f64) -> bool {
    l1(x, y) <= 1.0 + EPS
}

/// Open diamond: |x|+|y| < 1-ε.
#[inline]
pub fn strictly_inside(x: f64, y: f64) -> bool {
    l1(x, y) < 1.0 - EPS
}

/// Complement of the open diamond: |x|+|y| >= 1-ε (on the boundary or beyond it).
#[inline]
pub fn not_strictly_inside(x: f64, y: f64) -> bool {
    l1(x, y) >= 1.0 - EPS
}

/// |x|+|y| within ε of 1.
#[inline]
pub fn on_boundary(x: f64, y: f64) -> bool {
    let s = l1(x, y);
    s <= 1.0 + EPS && s >= 1.0 - EPS
}

/// The four stencil directions. The declaration order (S, W, E, N) is the order in
/// which per-direction data is stored in [`PerDirection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    South,
    West,
    East,
    North,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::North,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::South => 0,
            Direction::West => 1,
            Direction::East => 2,
            Direction::North => 3,
        }
    }

    /// Lattice step (di, dj).
    #[inline]
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::North => (0, 1),
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::South | Direction::North)
    }

    /// +1 for east/north, -1 for west/south.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::South | Direction::West => -1.0,
            Direction::East | Direction::North => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
            Direction::North => "north",
        }
    }
}

/// One value per [`Direction`], indexed by direction rather than by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerDirection<T>(pub [T; 4]);

impl<T: Copy> PerDirection<T> {
    #[inline]
    pub fn splat(v: T) -> Self {
        Self([v; 4])
    }

    pub fn from_fn<F: FnMut(Direction) -> T>(mut f: F) -> Self {
        Self(Direction::ALL.map(|d| f(d)))
    }

    /// (direction, value) pairs in S, W, E, N order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, T)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.0[d.index()]))
    }
}

impl<T> Index<Direction> for PerDirection<T> {
    type Output = T;

    #[inline]
    fn index(&self, d: Direction) -> &T {
        &self.0[d.index()]
    }
}

impl<T> IndexMut<Direction> for PerDirection<T> {
    #[inline]
    fn index_mut(&mut self, d: Direction) -> &mut T {
        &mut self.0[d.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_even_and_zero_resolution() {
        assert_eq!(
            DiamondGrid::new(4),
            Err(PoissonError::InvalidResolution { n: 4 })
        );
        assert_eq!(
            DiamondGrid::new(0),
            Err(PoissonError::InvalidResolution { n: 0 })
        );
        assert!(DiamondGrid::new(1).is_ok());
    }

    #[test]
    fn step_and_corners() {
        let g = DiamondGrid::new(3).unwrap();
        assert!((g.h - 0.25).abs() < 1e-15);
        assert_eq!(g.lattice_range(), -4..=4);
        let (x, y) = g.coords(4, 0);
        assert!(on_boundary(x, y));
        let (x, y) = g.coords(-2, 2);
        assert!(on_boundary(x, y));
        assert!(not_strictly_inside(x, y));
        assert!(!strictly_inside(x, y));
        assert!(inside(x, y));
    }

    #[test]
    fn predicates_outside() {
        assert!(!inside(0.75, 0.5));
        assert!(not_strictly_inside(0.75, 0.5));
        assert!(strictly_inside(0.25, 0.5));
        assert!(!on_boundary(0.0, 0.0));
    }

    #[test]
    fn direction_order_and_indexing() {
        let order: Vec<usize> = Direction::ALL.iter().map(|d| d.index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);

        let mut p = PerDirection::splat(0.0);
        p[Direction::East] = 2.0;
        assert_eq!(p.0, [0.0, 0.0, 2.0, 0.0]);

        let offsets = PerDirection::from_fn(|d| d.offset());
        assert_eq!(offsets[Direction::South], (0, -1));
        assert_eq!(offsets[Direction::North], (0, 1));
        assert!(Direction::North.is_vertical());
        assert!(!Direction::West.is_vertical());
    }
}
