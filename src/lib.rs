// src/lib.rs

pub mod boundary;
pub mod config;
pub mod error;
pub mod geometry_mask;
pub mod grid;
pub mod operator;
pub mod output;
pub mod problem;
pub mod solver;
pub mod stencil;
pub mod visualisation;

pub use error::{PoissonError, Result};
