pub const REDUCED_COST_TOLERANCE: f64 = 1e-5; // A column only enters the pool below -REDUCED_COST_TOLERANCE
pub const MAX_ITERATIONS: usize = 1000; // Generating iterations before the run is declared non-terminating
pub const ROUNDING_THRESHOLD: f64 = 0.5; // Binary solver values above this are read as 1

pub const MAX_CLIENTS: usize = 255; // Client ids are 1..=MAX_CLIENTS, bit 0 is never used
