// src/config.rs
//
// Run record written next to the outputs as config.json.

use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::boundary::BoundaryData;
use crate::operator::DiagonalConvention;
use crate::problem::Solution;
use crate::solver::SolverConfig;

#[derive(Serialize)]
pub struct RunConfig {
    pub grid: GridConfig,
    pub problem: ProblemConfig,
    pub solver: SolverConfig,
    pub result: Option<SolveSummary>,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct GridConfig {
    pub n: usize,
    pub h: f64,
    /// |Omega|.
    pub unknowns: usize,
}

#[derive(Serialize)]
pub struct ProblemConfig {
    pub bc: BoundaryData,
    /// Constant right-hand side of Δu = source.
    pub source: f64,
    pub diagonal: DiagonalConvention,
}

#[derive(Serialize)]
pub struct SolveSummary {
    pub iterations: usize,
    pub residual_norm: f64,
    pub boundary_rows: usize,
    pub u_min: f64,
    pub u_max: f64,
}

impl SolveSummary {
    pub fn from_solution(solution: &Solution) -> Self {
        let u_min = solution.u.iter().copied().fold(f64::INFINITY, f64::min);
        let u_max = solution.u.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            iterations: solution.iterations,
            residual_norm: solution.residual_norm,
            boundary_rows: solution.system.boundary_rows(),
            u_min,
            u_max,
        }
    }
}

#[derive(Serialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,
    /// "solve" or "points".
    pub mode: String,
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DiamondGrid;
    use crate::problem::solve_laplace;

    #[test]
    fn run_config_round_trips_through_json() {
        let g = DiamondGrid::new(3).unwrap();
        let solver = SolverConfig::default();
        let sol = solve_laplace(&g, &BoundaryData::Tent, DiagonalConvention::Scaled, &solver)
            .unwrap();

        let cfg = RunConfig {
            grid: GridConfig {
                n: g.n,
                h: g.h,
                unknowns: sol.system.dim(),
            },
            problem: ProblemConfig {
                bc: BoundaryData::Tent,
                source: 0.0,
                diagonal: DiagonalConvention::Scaled,
            },
            solver,
            result: Some(SolveSummary::from_solution(&sol)),
            run: RunInfo {
                binary: "diamond_poisson".to_string(),
                run_id: "test".to_string(),
                mode: "solve".to_string(),
            },
        };

        let dir = tempfile::tempdir().unwrap();
        cfg.write_to_dir(dir.path()).unwrap();
        let text = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["grid"]["n"], 3);
        assert_eq!(v["grid"]["unknowns"], 25);
        assert_eq!(v["problem"]["bc"], "Tent");
        assert_eq!(v["problem"]["diagonal"], "Scaled");
        assert!(v["result"]["u_max"].as_f64().unwrap() <= 1.0);
    }
}
