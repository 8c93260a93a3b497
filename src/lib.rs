//! Driver consistency by column generation: a set-covering master over multi-day driver paths,
//! priced by a binary subproblem, both solved with Gurobi.

pub mod clientset;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod path;
pub mod pricing;
pub mod utils;
