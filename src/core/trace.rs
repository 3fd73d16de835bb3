//! Synthetic ΔF/F traces of a population of neurons.
use serde::{Deserialize, Serialize};

/// The calcium traces of a population, stored as a (neurons, time-samples) matrix.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Traces {
    values: Vec<Vec<f64>>,
    num_samples: usize,
}

impl Traces {
    /// Rows must all have `num_samples` values.
    pub(crate) fn new(values: Vec<Vec<f64>>, num_samples: usize) -> Self {
        Traces {
            values,
            num_samples,
        }
    }

    pub fn num_neurons(&self) -> usize {
        self.values.len()
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_neurons(), self.num_samples())
    }

    pub fn row(&self, neuron: usize) -> Option<&[f64]> {
        self.values.get(neuron).map(|row| row.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.iter().map(|row| row.as_slice())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<f64>> {
        &mut self.values
    }

    /// An iterator over all values, in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.values
    }
}
