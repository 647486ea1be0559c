//! Supervisor module for run lifecycle and outcome reporting.

mod outcome;
mod runner;
mod state;

pub use outcome::*;
pub use runner::*;
pub use state::*;
