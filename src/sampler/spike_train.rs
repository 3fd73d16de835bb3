//! This module provides functionality for sampling random binned spike trains.
//!
//! Every bin independently holds a spike with probability `firing_rate / frame_rate`.
//!
//! # Examples
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rusty_calcium::sampler::spike_train::BernoulliSpikeTrainSampler;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let firing_rate = 2.0;
//! let duration = 10.0;
//! let frame_rate = 30.0;
//!
//! let sampler = BernoulliSpikeTrainSampler::build(firing_rate, duration, frame_rate).unwrap();
//! let spike_trains = sampler.sample(5, &mut rng);
//!
//! assert_eq!(spike_trains.shape(), (5, 300));
//! ```
use log;
use rand::Rng;

use crate::core::spike_train::SpikeTrains;
use crate::core::synthesizer::{checked_num_samples, validate_frame_rate};
use crate::error::CalciumError;

/// Represents a sampler for generating binned spike trains with independent bins.
#[derive(Debug, PartialEq, Clone)]
pub struct BernoulliSpikeTrainSampler {
    /// The number of bins per spike train.
    num_bins: usize,
    /// The probability of a spike in a bin.
    p_spike: f64,
}

impl BernoulliSpikeTrainSampler {
    /// Creates a new sampler for spike trains of `duration` seconds, binned at `frame_rate`, with mean `firing_rate` (in Hz).
    /// Firing rates above the frame rate saturate, i.e., every bin holds a spike.
    pub fn build(firing_rate: f64, duration: f64, frame_rate: f64) -> Result<Self, CalciumError> {
        validate_frame_rate(frame_rate)?;

        if !firing_rate.is_finite() || firing_rate < 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid firing rate value: must be non-negative".to_string(),
            ));
        }

        if !duration.is_finite() || duration <= 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid duration value: must be positive".to_string(),
            ));
        }

        Ok(BernoulliSpikeTrainSampler {
            num_bins: checked_num_samples(duration, frame_rate)?,
            p_spike: (firing_rate / frame_rate).min(1.0),
        })
    }

    /// The number of bins per spike train.
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// The probability of a spike in a bin.
    pub fn p_spike(&self) -> f64 {
        self.p_spike
    }

    /// Samples `num_neurons` spike trains.
    pub fn sample<R: Rng + ?Sized>(&self, num_neurons: usize, rng: &mut R) -> SpikeTrains {
        // rows are rectangular and binary by construction
        let spike_trains = SpikeTrains::new(
            (0..num_neurons)
                .map(|_| {
                    (0..self.num_bins)
                        .map(|_| if rng.gen_bool(self.p_spike) { 1.0 } else { 0.0 })
                        .collect()
                })
                .collect(),
            self.num_bins,
        );

        log::trace!(
            "{} spikes sampled over {} channels (expected number of spikes per channel is {})",
            spike_trains.num_spikes(),
            num_neurons,
            self.p_spike * self.num_bins as f64
        );

        spike_trains
    }
}

/// Samples `num_neurons` spike trains of `ceil(duration * frame_rate)` bins firing at `firing_rate` (in Hz).
pub fn generate_spike_trains<R: Rng + ?Sized>(
    firing_rate: f64,
    duration: f64,
    num_neurons: usize,
    frame_rate: f64,
    rng: &mut R,
) -> Result<SpikeTrains, CalciumError> {
    let sampler = BernoulliSpikeTrainSampler::build(firing_rate, duration, frame_rate)?;
    Ok(sampler.sample(num_neurons, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::core::synthesizer::MAX_NUM_SAMPLES;

    const SEED: u64 = 42;

    #[test]
    fn test_build() {
        let sampler = BernoulliSpikeTrainSampler::build(2.0, 10.0, 30.0).unwrap();
        assert_eq!(sampler.num_bins(), 300);
        assert!((sampler.p_spike() - 2.0 / 30.0).abs() < 1e-15);

        let sampler = BernoulliSpikeTrainSampler::build(50.0, 1.5, 10.0).unwrap();
        assert_eq!(sampler.num_bins(), 15);
        assert_eq!(sampler.p_spike(), 1.0);

        assert_eq!(
            BernoulliSpikeTrainSampler::build(-1.0, 10.0, 30.0),
            Err(CalciumError::InvalidParameter(
                "Invalid firing rate value: must be non-negative".to_string()
            ))
        );
        assert_eq!(
            BernoulliSpikeTrainSampler::build(1.0, 0.0, 30.0),
            Err(CalciumError::InvalidParameter(
                "Invalid duration value: must be positive".to_string()
            ))
        );
        assert_eq!(
            BernoulliSpikeTrainSampler::build(1.0, 1e300, 30.0),
            Err(CalciumError::InvalidParameter(format!(
                "Invalid duration value: more than {} samples",
                MAX_NUM_SAMPLES
            )))
        );
        assert_eq!(
            BernoulliSpikeTrainSampler::build(1.0, 10.0, 0.0),
            Err(CalciumError::InvalidParameter(
                "Invalid frame rate value: must be positive".to_string()
            ))
        );
    }

    #[test]
    fn test_generate_spike_trains() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let spike_trains = generate_spike_trains(3.0, 100.0, 20, 30.0, &mut rng).unwrap();

        assert_eq!(spike_trains.shape(), (20, 3000));
        assert!(spike_trains
            .rows()
            .all(|row| row.iter().all(|b| *b == 0.0 || *b == 1.0)));

        // empirical rate close to 0.1 spike per bin
        let rate = spike_trains.num_spikes() as f64 / 60_000.0;
        assert!((rate - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_generate_spike_trains_corner_cases() {
        let mut rng = StdRng::seed_from_u64(SEED);

        let silent = generate_spike_trains(0.0, 10.0, 5, 30.0, &mut rng).unwrap();
        assert_eq!(silent.num_spikes(), 0);

        let saturated = generate_spike_trains(1e6, 1.0, 5, 30.0, &mut rng).unwrap();
        assert_eq!(saturated.num_spikes(), 150);

        // partial last bin
        let spike_trains = generate_spike_trains(1.0, 1.05, 2, 10.0, &mut rng).unwrap();
        assert_eq!(spike_trains.num_bins(), 11);

        let none = generate_spike_trains(1.0, 1.0, 0, 10.0, &mut rng).unwrap();
        assert_eq!(none.shape(), (0, 10));
    }

    #[test]
    fn test_generate_spike_trains_reproducible() {
        let first = generate_spike_trains(5.0, 2.0, 4, 20.0, &mut StdRng::seed_from_u64(SEED)).unwrap();
        let second = generate_spike_trains(5.0, 2.0, 4, 20.0, &mut StdRng::seed_from_u64(SEED)).unwrap();
        assert_eq!(first, second);
    }
}
