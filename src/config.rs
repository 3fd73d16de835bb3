//! Configuration of a simulation, (de)serializable from JSON.
//!
//! # Examples
//!
//! ```rust
//! use rusty_calcium::config::SimulationConfig;
//!
//! let config: SimulationConfig = serde_json::from_str(r#"{"num_neurons": 8, "kernel": {"tau1": 0.7}}"#).unwrap();
//! assert_eq!(config.num_neurons, 8);
//! assert_eq!(config.kernel.tau1, 0.7);
//! assert_eq!(config.snr, 10.0);
//! ```
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::kernel::KernelParameters;
use crate::core::noise::validate_snr;
use crate::core::synthesizer::validate_frame_rate;
use crate::core::DEFAULT_SNR;
use crate::error::CalciumError;

/// All the parameters of a simulation: spike trains sampling, kernel and noise.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// The frame rate of the recording (in Hz).
    pub frame_rate: f64,
    /// The duration of the recording (in seconds).
    pub duration: f64,
    /// The number of neurons.
    pub num_neurons: usize,
    /// The mean firing rate of the neurons (in Hz).
    pub firing_rate: f64,
    /// The signal-to-noise ratio.
    pub snr: f64,
    /// The seed used for spike trains and noise sampling.
    pub seed: u64,
    /// The indicator kernel.
    pub kernel: KernelParameters,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            frame_rate: 30.0,
            duration: 60.0,
            num_neurons: 4,
            firing_rate: 0.5,
            snr: DEFAULT_SNR,
            seed: 42,
            kernel: KernelParameters::default(),
        }
    }
}

impl SimulationConfig {
    /// Check all parameters are valid.
    pub fn validate(&self) -> Result<(), CalciumError> {
        validate_frame_rate(self.frame_rate)?;
        validate_snr(self.snr)?;
        self.kernel.validate()?;

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid duration value: must be positive".to_string(),
            ));
        }

        if !self.firing_rate.is_finite() || self.firing_rate < 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid firing rate value: must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Read and validate a configuration from a JSON file. Missing fields take their default value.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CalciumError> {
        let file = File::open(path)?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| CalciumError::IOError(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CalciumError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| CalciumError::IOError(format!("Failed to write configuration: {}", e)))
    }
}
