//! Error module for the Rusty Calcium library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum CalciumError {
    /// Error for a spike-train matrix that is not a (neurons, time-bins) array, e.g., ragged rows.
    InvalidShape(String),
    /// Error for invalid parameters, e.g., a non-positive time constant or frame rate.
    InvalidParameter(String),
    /// Error for I/O operations, e.g., writing a figure or reading a configuration file.
    IOError(String),
}

impl fmt::Display for CalciumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CalciumError::InvalidShape(e) => write!(f, "Invalid shape: {}", e),
            CalciumError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            CalciumError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for CalciumError {}

impl From<std::io::Error> for CalciumError {
    fn from(e: std::io::Error) -> Self {
        CalciumError::IOError(e.to_string())
    }
}
