//! Linear programming with the dense tableau simplex method, including a
//! two-phase start for problems without a feasible slack basis.

pub mod error;
pub mod config;
pub mod problem;
pub mod tableau;
pub mod builder;
pub mod simplex;
pub mod two_phase;
pub mod solution;

mod test_util;
mod random_tests;

pub use builder::{build_tableau, Constraint, Direction, Objective, Operator, Problem};
pub use config::SolverOptions;
pub use error::Error;
pub use problem::Status;
pub use solution::{Solution, VariableValue};
pub use tableau::Tableau;
