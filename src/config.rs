use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ITERATIONS, REDUCED_COST_TOLERANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricerKind {
    /// Binary program solved by Gurobi
    Mip,
    /// Exhaustive search over every day x route combination
    Enumeration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColGenConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub pricer: PricerKind,
    /// Keep Gurobi's own console output
    pub solver_output: bool,
}

impl Default for ColGenConfig {
    fn default() -> Self {
        ColGenConfig {
            tolerance: REDUCED_COST_TOLERANCE,
            max_iterations: MAX_ITERATIONS,
            pricer: PricerKind::Mip,
            solver_output: false,
        }
    }
}
