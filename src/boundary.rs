// src/boundary.rs
//
// Dirichlet data and boundary-distance resolution.
//
// For an interior point and a direction d, the uniform neighbour (x, y) + h*d is either
// strictly inside the diamond (an unknown, coupled through the stencil) or on/beyond the
// boundary. In the latter case the crossing with the boundary is computed from the edge
// equations |x|+|y| = 1:
//   north/south: y_b = ±(1 - |x|)
//   east/west:   x_b = ±(1 - |y|)
// and the stencil uses the true distance to the crossing together with bc(crossing).

use serde::Serialize;

use crate::grid::{self, Direction, PerDirection};

/// Dirichlet boundary data g(x, y). Any `Fn(f64, f64) -> f64` closure qualifies.
pub trait BoundaryValue {
    fn value(&self, x: f64, y: f64) -> f64;
}

impl<F> BoundaryValue for F
where
    F: Fn(f64, f64) -> f64,
{
    #[inline]
    fn value(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Named boundary data used by the CLI and the tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BoundaryData {
    /// g = 1 - |x|.
    #[default]
    Tent,
    /// g = x + 2y (harmonic; the five-point scheme reproduces it exactly).
    Linear,
    /// g = x^2 - y^2 (harmonic).
    Harmonic,
    /// g = x^2 + y^2 (Laplacian 4).
    Quadratic,
}

impl BoundaryData {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tent" | "abs" | "default" => Some(Self::Tent),
            "linear" => Some(Self::Linear),
            "harmonic" | "saddle" => Some(Self::Harmonic),
            "quadratic" | "paraboloid" => Some(Self::Quadratic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tent => "tent",
            Self::Linear => "linear",
            Self::Harmonic => "harmonic",
            Self::Quadratic => "quadratic",
        }
    }

    /// Laplacian of the natural extension of the data into the domain, used as the
    /// default source term so that the exact solution is the data itself
    /// (not applicable to `Tent`, whose extension has a kink on x = 0).
    pub fn laplacian(&self) -> f64 {
        match self {
            Self::Quadratic => 4.0,
            Self::Tent | Self::Linear | Self::Harmonic => 0.0,
        }
    }
}

impl BoundaryValue for BoundaryData {
    fn value(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Tent => 1.0 - x.abs(),
            Self::Linear => x + 2.0 * y,
            Self::Harmonic => x * x - y * y,
            Self::Quadratic => x * x + y * y,
        }
    }
}

/// Per-direction stencil data for one interior point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilCorrection {
    /// Distance to the neighbour (h) or to the boundary crossing.
    pub steps: PerDirection<f64>,
    /// Dirichlet value at the crossing, 0 where the neighbour is an unknown.
    pub values: PerDirection<f64>,
    /// Boundary crossing point, if the uniform neighbour is not strictly inside.
    pub crossings: PerDirection<Option<(f64, f64)>>,
}

impl StencilCorrection {
    /// True if no direction needed a boundary correction.
    pub fn is_uniform(&self) -> bool {
        self.crossings.0.iter().all(Option::is_none)
    }

    /// Boundary contribution to the right-hand side: -Σ v_d / h_d².
    pub fn rhs_contribution(&self) -> f64 {
        let mut acc = 0.0;
        for (d, v) in self.values.iter() {
            let hd = self.steps[d];
            acc -= v / (hd * hd);
        }
        acc
    }
}

/// Boundary crossing from (x, y) along `d`, if the uniform neighbour at distance `h`
/// is on or beyond the boundary.
pub fn boundary_crossing(x: f64, y: f64, h: f64, d: Direction) -> Option<(f64, f64)> {
    let (di, dj) = d.offset();
    if !grid::not_strictly_inside(x + h * di as f64, y + h * dj as f64) {
        return None;
    }
    let s = d.sign();
    if d.is_vertical() {
        Some((x, s * (1.0 - x.abs())))
    } else {
        Some((s * (1.0 - y.abs()), y))
    }
}

/// Resolve step sizes and boundary values for the point (x, y) on a grid of step `h`.
pub fn resolve<B: BoundaryValue + ?Sized>(x: f64, y: f64, h: f64, bc: &B) -> StencilCorrection {
    let crossings = PerDirection::from_fn(|d| boundary_crossing(x, y, h, d));
    let mut steps = PerDirection::splat(h);
    let mut values = PerDirection::splat(0.0);

    for (d, crossing) in crossings.iter() {
        if let Some((xb, yb)) = crossing {
            let dist = if d.is_vertical() {
                (yb - y).abs()
            } else {
                (xb - x).abs()
            };
            steps[d] = dist;
            values[d] = bc.value(xb, yb);
        }
    }

    StencilCorrection {
        steps,
        values,
        crossings,
    }
}
