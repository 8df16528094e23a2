// src/main.rs
//
// CLI driver: solve the Dirichlet problem on the diamond and write the results.
//
// Examples:
//
//   cargo run --release -- n=45
//       -> tent data g = 1 - |x|, writes ../img/poisson_eq_diamond.png and friends
//          (only if ../img exists; otherwise the solve runs and nothing is written).
//
//   cargo run --release -- points all n=9
//       -> classification scatter of interior + boundary points.
//
//   cargo run --release -- n=31 bc=quadratic convention=unscaled out=runs
//
// Outputs (in the output directory):
//   ├── config.json
//   ├── solution.csv              (solve mode)
//   ├── poisson_eq_diamond.png    (solve mode, 3-D scatter)
//   ├── poisson_eq_heatmap.png    (solve mode, top view)
//   ├── points.csv                (points mode)
//   └── points_in_omega.png       (points mode)
//
// Logging via RUST_LOG (default: info).

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use diamond_poisson::boundary::BoundaryData;
use diamond_poisson::config::{GridConfig, ProblemConfig, RunConfig, RunInfo, SolveSummary};
use diamond_poisson::geometry_mask::{enumerate, PointClass};
use diamond_poisson::grid::DiamondGrid;
use diamond_poisson::operator::DiagonalConvention;
use diamond_poisson::output::{write_classification_csv, write_solution_csv};
use diamond_poisson::problem::solve_poisson;
use diamond_poisson::solver::SolverConfig;
use diamond_poisson::visualisation::{
    save_classification_plot, save_solution_heatmap, save_solution_surface,
};

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run -- [points] [all] [n=ODD] [bc=tent|linear|harmonic|quadratic]
             [convention=scaled|unscaled] [out=DIR] [run=RUN_ID]

Notes:
  - n must be a positive odd integer (default 45); h = 1/(n+1).
  - 'points' renders the grid classification instead of solving;
    'all' includes boundary points in that plot.
  - Outputs go to out=DIR (default ../img) only if that directory exists.
  - Solver overrides: DIAMOND_SOLVER_MAX_ITERS, DIAMOND_SOLVER_RTOL, DIAMOND_SOLVER_ATOL.
"#
    );
}

/// Log and drop a failed render or write; the solution stays valid.
fn report<E: std::fmt::Display>(what: &str, res: std::result::Result<(), E>) {
    match res {
        Ok(()) => log::info!("wrote {what}"),
        Err(e) => log::warn!("could not write {what}: {e}"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut n: usize = 45;
    let mut bc = BoundaryData::Tent;
    let mut convention = DiagonalConvention::Scaled;
    let mut points_mode = false;
    let mut include_boundary = false;
    let mut out_dir = PathBuf::from("../img");
    let mut run_id_override: Option<String> = None;

    for arg in env::args().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }
        if arg == "points" {
            points_mode = true;
            continue;
        }
        if arg == "all" {
            include_boundary = true;
            continue;
        }
        if let Some(v) = arg.strip_prefix("n=") {
            n = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("could not parse n='{v}'"))?;
            continue;
        }
        if let Some(v) = arg.strip_prefix("bc=") {
            bc = BoundaryData::from_str(v).unwrap_or_else(|| {
                log::warn!("unknown bc '{v}', using tent");
                BoundaryData::Tent
            });
            continue;
        }
        if let Some(v) = arg.strip_prefix("convention=") {
            convention = DiagonalConvention::from_str(v).unwrap_or_else(|| {
                log::warn!("unknown convention '{v}', using scaled");
                DiagonalConvention::Scaled
            });
            continue;
        }
        if let Some(v) = arg.strip_prefix("out=") {
            out_dir = PathBuf::from(v);
            continue;
        }
        if let Some(v) = arg.strip_prefix("run=") {
            run_id_override = Some(v.to_string());
            continue;
        }
        log::warn!("ignoring unknown argument '{arg}'");
    }

    let grid = DiamondGrid::new(n)?;
    let writable = out_dir.is_dir();
    if !writable {
        log::info!(
            "output directory {} does not exist; results will not be written",
            out_dir.display()
        );
    }

    let solver = SolverConfig::from_env();
    let source = bc.laplacian();
    let mode = if points_mode { "points" } else { "solve" };
    let run_id = run_id_override
        .unwrap_or_else(|| format!("n{}_{}_{}_{}", n, bc.as_str(), convention.as_str(), mode));

    let mut record = RunConfig {
        grid: GridConfig {
            n,
            h: grid.h,
            unknowns: grid.interior_count(),
        },
        problem: ProblemConfig {
            bc,
            source,
            diagonal: convention,
        },
        solver,
        result: None,
        run: RunInfo {
            binary: "diamond_poisson".to_string(),
            run_id,
            mode: mode.to_string(),
        },
    };

    if points_mode {
        let classified = enumerate(&grid, !include_boundary);
        println!(
            "N={}: {} points ({} interior, {} near-boundary, {} on-boundary)",
            n,
            classified.len(),
            classified.count(PointClass::Interior),
            classified.count(PointClass::NearBoundary),
            classified.count(PointClass::OnBoundary)
        );
        if writable {
            report(
                "points.csv",
                write_classification_csv(&classified, &out_dir.join("points.csv")),
            );
            report(
                "points_in_omega.png",
                save_classification_plot(&classified, &out_dir.join("points_in_omega.png")),
            );
        }
    } else {
        let solution = solve_poisson(&grid, &bc, &|_: f64, _: f64| source, convention, &solver)?;
        let summary = SolveSummary::from_solution(&solution);
        println!(
            "N={}: {} unknowns, {} iterations, residual {:.3e}, u in [{:.6}, {:.6}]",
            n,
            solution.system.dim(),
            summary.iterations,
            summary.residual_norm,
            summary.u_min,
            summary.u_max
        );
        record.result = Some(summary);

        if writable {
            report(
                "solution.csv",
                write_solution_csv(&solution, &out_dir.join("solution.csv")),
            );
            report(
                "poisson_eq_diamond.png",
                save_solution_surface(&solution, &out_dir.join("poisson_eq_diamond.png")),
            );
            report(
                "poisson_eq_heatmap.png",
                save_solution_heatmap(&solution, &out_dir.join("poisson_eq_heatmap.png")),
            );
        }
    }

    if writable {
        report("config.json", record.write_to_dir(&out_dir));
    }
    Ok(())
}
