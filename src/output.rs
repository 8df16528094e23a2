// src/output.rs
//
// Plain-text dumps of the point cloud and the solution (one CSV row per point).

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::geometry_mask::ClassifiedPoints;
use crate::problem::Solution;

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

/// `i,j,x,y,u` for every unknown, in operator row order.
pub fn write_solution_csv(solution: &Solution, path: &Path) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "i,j,x,y,u")?;
    for (p, u) in solution.points().iter().zip(&solution.u) {
        writeln!(w, "{},{},{:.16e},{:.16e},{:.16e}", p.i, p.j, p.x, p.y, u)?;
    }
    w.flush()
}

/// `i,j,x,y,class` for every classified point.
pub fn write_classification_csv(points: &ClassifiedPoints, path: &Path) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "i,j,x,y,class")?;
    for (p, c) in points.points.iter().zip(&points.labels) {
        writeln!(w, "{},{},{:.16e},{:.16e},{}", p.i, p.j, p.x, p.y, c.as_str())?;
    }
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_mask::enumerate;
    use crate::grid::DiamondGrid;

    #[test]
    fn classification_csv_has_one_row_per_point() {
        let g = DiamondGrid::new(3).unwrap();
        let pts = enumerate(&g, false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("points.csv");
        write_classification_csv(&pts, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "i,j,x,y,class");
        assert_eq!(lines.len(), 1 + g.closure_count());
        assert!(lines[1].starts_with("0,-4,"));
        assert!(lines[1].ends_with(",on-boundary"));
    }
}
