use std::error::Error;
use std::fmt;

use grb::Status;

pub type Result<T> = std::result::Result<T, ColGenError>;

#[derive(Debug)]
pub enum ColGenError {
    Solver(grb::Error),
    InfeasibleModel(&'static str),
    UnboundedModel(&'static str),
    UnexpectedStatus { model: &'static str, status: Status },
    NonTermination { iterations: usize },
    UncoveredSlot { day: usize, slot: usize },
    DuplicateColumn { path: usize },
    InvalidInstance(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ColGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColGenError::Solver(e) => write!(f, "solver error: {e}"),
            ColGenError::InfeasibleModel(model) => write!(f, "{model} model is infeasible"),
            ColGenError::UnboundedModel(model) => write!(f, "{model} model is unbounded"),
            ColGenError::UnexpectedStatus { model, status } => {
                write!(f, "{model} model finished with status {status:?}")
            }
            ColGenError::NonTermination { iterations } => {
                write!(f, "column generation did not converge within {iterations} iterations")
            }
            ColGenError::UncoveredSlot { day, slot } => {
                write!(f, "no path in the pool covers slot {slot} on day {day}")
            }
            ColGenError::DuplicateColumn { path } => {
                write!(f, "pricing returned existing column P{path} with negative reduced cost")
            }
            ColGenError::InvalidInstance(msg) => write!(f, "invalid instance: {msg}"),
            ColGenError::Io(e) => write!(f, "io error: {e}"),
            ColGenError::Json(e) => write!(f, "malformed instance: {e}"),
        }
    }
}

impl Error for ColGenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ColGenError::Solver(e) => Some(e),
            ColGenError::Io(e) => Some(e),
            ColGenError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<grb::Error> for ColGenError {
    fn from(e: grb::Error) -> Self {
        ColGenError::Solver(e)
    }
}

impl From<std::io::Error> for ColGenError {
    fn from(e: std::io::Error) -> Self {
        ColGenError::Io(e)
    }
}

impl From<serde_json::Error> for ColGenError {
    fn from(e: serde_json::Error) -> Self {
        ColGenError::Json(e)
    }
}
