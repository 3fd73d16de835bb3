//! Binned spike trains of a population of neurons.
use serde::{Deserialize, Serialize};

use crate::error::CalciumError;

/// A population of binned spike trains, stored as a (neurons, time-bins) matrix.
/// Every nonzero bin holds a spike.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeTrains {
    bins: Vec<Vec<f64>>,
    /// The number of time-bins, also kept when there is no neuron.
    num_bins: usize,
}

impl SpikeTrains {
    /// Create spike trains from a list of rows, one per neuron.
    /// The function returns an error for ragged rows or for negative/non-finite entries.
    pub fn build(bins: Vec<Vec<f64>>) -> Result<Self, CalciumError> {
        let num_bins = bins.first().map_or(0, |row| row.len());
        SpikeTrains::build_with_bins(bins, num_bins)
    }

    fn build_with_bins(bins: Vec<Vec<f64>>, num_bins: usize) -> Result<Self, CalciumError> {
        if let Some(i) = bins.iter().position(|row| row.len() != num_bins) {
            return Err(CalciumError::InvalidShape(format!(
                "spike trains should have format (num. neurons, time-steps): row {} has {} bins, expected {}",
                i,
                bins[i].len(),
                num_bins
            )));
        }

        if bins
            .iter()
            .any(|row| row.iter().any(|b| !b.is_finite() || *b < 0.0))
        {
            return Err(CalciumError::InvalidParameter(
                "Invalid spike train entry: must be finite and non-negative".to_string(),
            ));
        }

        Ok(SpikeTrains { bins, num_bins })
    }

    /// Create spike trains from a row-major buffer and its shape.
    /// The shape must have exactly two dimensions, (num. neurons, time-steps).
    pub fn from_shape_vec(shape: &[usize], data: Vec<f64>) -> Result<Self, CalciumError> {
        let (num_neurons, num_bins) = match shape {
            [num_neurons, num_bins] => (*num_neurons, *num_bins),
            _ => {
                return Err(CalciumError::InvalidShape(format!(
                    "spike trains should have format (num. neurons, time-steps), got {} dimension(s)",
                    shape.len()
                )))
            }
        };

        let num_entries = num_neurons.checked_mul(num_bins).ok_or_else(|| {
            CalciumError::InvalidShape(format!(
                "shape ({}, {}) has too many entries",
                num_neurons, num_bins
            ))
        })?;

        if num_entries != data.len() {
            return Err(CalciumError::InvalidShape(format!(
                "shape ({}, {}) does not match {} entries",
                num_neurons,
                num_bins,
                data.len()
            )));
        }

        let rows = if num_bins == 0 {
            vec![vec![]; num_neurons]
        } else {
            data.chunks(num_bins).map(|row| row.to_vec()).collect()
        };
        SpikeTrains::build_with_bins(rows, num_bins)
    }

    /// Rows must all have `num_bins` binary entries.
    pub(crate) fn new(bins: Vec<Vec<f64>>, num_bins: usize) -> Self {
        SpikeTrains { bins, num_bins }
    }

    /// Spike trains without any spike.
    pub fn silent(num_neurons: usize, num_bins: usize) -> Self {
        SpikeTrains {
            bins: vec![vec![0.0; num_bins]; num_neurons],
            num_bins,
        }
    }

    /// The number of neurons (rows).
    pub fn num_neurons(&self) -> usize {
        self.bins.len()
    }

    /// The number of time-bins (columns).
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_neurons(), self.num_bins())
    }

    /// The total number of spikes in the population.
    pub fn num_spikes(&self) -> usize {
        self.bins
            .iter()
            .map(|row| row.iter().filter(|b| **b != 0.0).count())
            .sum()
    }

    pub fn row(&self, neuron: usize) -> Option<&[f64]> {
        self.bins.get(neuron).map(|row| row.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.bins.iter().map(|row| row.as_slice())
    }

    /// The (sorted) spike times in seconds of a neuron, i.e., the indices of its nonzero bins divided by the frame rate.
    /// Returns `None` if the neuron is not found.
    pub fn spike_times(&self, neuron: usize, frame_rate: f64) -> Option<Vec<f64>> {
        self.row(neuron)
            .map(|row| bins_to_times(row, frame_rate))
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.bins
    }
}

/// Convert a row of bins to spike times in seconds.
pub(crate) fn bins_to_times(row: &[f64], frame_rate: f64) -> Vec<f64> {
    row.iter()
        .enumerate()
        .filter(|(_, b)| **b != 0.0)
        .map(|(i, _)| i as f64 / frame_rate)
        .collect()
}
