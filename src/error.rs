//! Simulation configuration errors.
//!
//! The simulation itself has no recoverable I/O; the only fallible paths are
//! static-data validation at startup, which should fail fast rather than
//! limp along with a broken spawn table.

use std::fmt;

#[derive(Debug)]
pub enum SimError {
    /// A wave script referenced a spawn id outside the unit lookup table.
    UnknownSpawnId {
        id: i32,
        max: i32,
    },
    /// A wave script ended without an end-of-level sentinel.
    UnterminatedScript,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownSpawnId { id, max } => {
                write!(f, "wave script spawn id {} out of range (max {})", id, max)
            }
            SimError::UnterminatedScript => {
                write!(f, "wave script has no end-of-level sentinel")
            }
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
