#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The transform fitting code only depends on the [`NonlinearSolver`] trait,
//! so any minimizer honoring its contract can be injected. [`LevenbergMarquardt`]
//! is the implementation used by default.

mod levenberg_marquardt;
mod solver;

pub use levenberg_marquardt::LevenbergMarquardt;
pub use solver::{NonlinearSolver, OptimizerError, SolverReport, TerminationReason};
