// src/visualisation.rs
//
// PNG rendering of the classified point cloud and of the discrete solution.
//
// Every function here returns a boxed error; callers treat a failed render as
// non-fatal and keep the computed solution.

use std::path::Path;

use plotters::prelude::*;

use crate::geometry_mask::{ClassifiedPoints, PointClass};
use crate::problem::Solution;

type PlotResult = Result<(), Box<dyn std::error::Error>>;

fn class_color(class: PointClass) -> RGBColor {
    match class {
        PointClass::Interior => RGBColor(68, 1, 84),
        PointClass::NearBoundary => RGBColor(33, 145, 140),
        PointClass::OnBoundary => RGBColor(253, 231, 37),
    }
}

/// Map a value to blue–white–red using [lo, hi]; falls back to [-1, 1] for a
/// degenerate range.
fn value_to_color(v: f64, lo: f64, hi: f64) -> RGBColor {
    let (mut lo, mut hi) = (lo, hi);
    if !lo.is_finite() || !hi.is_finite() || (hi - lo).abs() < 1e-12 {
        lo = -1.0;
        hi = 1.0;
    }

    let x = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    let r = (255.0 * x) as u8;
    let b = (255.0 * (1.0 - x)) as u8;
    let g = (255.0 * (1.0 - (2.0 * (x - 0.5).abs()))).clamp(0.0, 255.0) as u8;
    RGBColor(r, g, b)
}

fn finite_range(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    if (hi - lo).abs() < 1e-12 {
        return (lo - 0.5, hi + 0.5);
    }
    (lo, hi)
}

/// Scatter plot of classified grid points, coloured by label.
pub fn save_classification_plot(points: &ClassifiedPoints, filename: &Path) -> PlotResult {
    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .caption("Grid points in the diamond |x|+|y| <= 1", ("sans-serif", 22))
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(-1.1f64..1.1f64, -1.1f64..1.1f64)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for class in [
        PointClass::Interior,
        PointClass::NearBoundary,
        PointClass::OnBoundary,
    ] {
        let color = class_color(class);
        chart
            .draw_series(
                points
                    .points
                    .iter()
                    .zip(&points.labels)
                    .filter(|(_, c)| **c == class)
                    .map(|(p, _)| Circle::new((p.x, p.y), 3, color.filled())),
            )?
            .label(class.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Top view of the solution: one coloured h×h square per unknown.
pub fn save_solution_heatmap(solution: &Solution, filename: &Path) -> PlotResult {
    let (lo, hi) = finite_range(&solution.u);
    let half = 0.5 * solution.system.grid.h;

    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .caption(
            format!("u_h (blue = {lo:.3}, red = {hi:.3})"),
            ("sans-serif", 20),
        )
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(-1.05f64..1.05f64, -1.05f64..1.05f64)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(solution.points().iter().zip(&solution.u).map(|(p, &u)| {
        Rectangle::new(
            [(p.x - half, p.y - half), (p.x + half, p.y + half)],
            value_to_color(u, lo, hi).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// 3-D scatter of (x, y, u_h), u on the vertical axis.
pub fn save_solution_surface(solution: &Solution, filename: &Path) -> PlotResult {
    let (lo, hi) = finite_range(&solution.u);

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Poisson equation on the diamond grid", ("sans-serif", 26))
        .build_cartesian_3d(-1.0f64..1.0f64, lo..hi, -1.0f64..1.0f64)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()?;

    chart.draw_series(
        solution
            .points()
            .iter()
            .zip(&solution.u)
            .map(|(p, &u)| Circle::new((p.x, u, p.y), 2, value_to_color(u, lo, hi).filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_map_endpoints() {
        assert_eq!(value_to_color(0.0, 0.0, 1.0), RGBColor(0, 0, 255));
        assert_eq!(value_to_color(1.0, 0.0, 1.0), RGBColor(255, 0, 0));
        assert_eq!(value_to_color(0.5, 0.0, 1.0), RGBColor(127, 255, 127));
        // degenerate range falls back to [-1, 1]
        assert_eq!(value_to_color(1.0, 2.0, 2.0), RGBColor(255, 0, 0));
    }

    #[test]
    fn range_ignores_non_finite_values() {
        assert_eq!(finite_range(&[f64::NAN, 1.0, 3.0]), (1.0, 3.0));
        assert_eq!(finite_range(&[]), (-1.0, 1.0));
        assert_eq!(finite_range(&[2.0, 2.0]), (1.5, 2.5));
    }
}
