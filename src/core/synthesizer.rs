//! Conversion of spike trains to calcium traces.
//!
//! Every spike contributes a copy of the kernel, starting at its spike time, to the trace of its neuron.
//! Contributions add up linearly, and Gaussian noise calibrated on the kernel peak is finally added.
use log;
use rand::Rng;
use rayon::prelude::*;

use crate::core::kernel::KernelParameters;
use crate::core::noise::{add_noise, add_noise_sharded, noise_std};
use crate::core::spike_train::{bins_to_times, SpikeTrains};
use crate::core::trace::Traces;
use crate::core::MIN_NEURONS_PAR;
use crate::error::CalciumError;

/// Tolerance to absorb floating-point errors when converting a duration to a number of samples.
const NUM_SAMPLES_TOLERANCE: f64 = 1e-9;

/// The maximum number of samples per trace.
pub const MAX_NUM_SAMPLES: usize = u32::MAX as usize;

/// Check the frame rate is positive and finite.
pub fn validate_frame_rate(frame_rate: f64) -> Result<(), CalciumError> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(CalciumError::InvalidParameter(
            "Invalid frame rate value: must be positive".to_string(),
        ));
    }
    Ok(())
}

/// The number of samples recorded at `frame_rate` over `duration` seconds, i.e., `ceil(duration * frame_rate)`.
pub fn num_samples(duration: f64, frame_rate: f64) -> usize {
    let exact = duration * frame_rate;
    let nearest = exact.round();
    if (exact - nearest).abs() < NUM_SAMPLES_TOLERANCE {
        nearest as usize
    } else {
        exact.ceil() as usize
    }
}

/// Same as [`num_samples`], but returns an error if there are more than [`MAX_NUM_SAMPLES`] samples.
pub fn checked_num_samples(duration: f64, frame_rate: f64) -> Result<usize, CalciumError> {
    if duration * frame_rate > MAX_NUM_SAMPLES as f64 {
        return Err(CalciumError::InvalidParameter(format!(
            "Invalid duration value: more than {} samples",
            MAX_NUM_SAMPLES
        )));
    }
    Ok(num_samples(duration, frame_rate))
}

/// Returns the trace produced by a single neuron firing at `spike_times` (in seconds).
/// The trace is sampled at `frame_rate` from time 0 and has `ceil(duration * frame_rate)` samples.
/// Noise is not included.
pub fn times_to_trace(
    spike_times: &[f64],
    duration: f64,
    frame_rate: f64,
    kernel: &KernelParameters,
) -> Result<Vec<f64>, CalciumError> {
    validate_frame_rate(frame_rate)?;
    kernel.validate()?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(CalciumError::InvalidParameter(
            "Invalid duration value: must be non-negative".to_string(),
        ));
    }

    if spike_times.iter().any(|t| !t.is_finite()) {
        return Err(CalciumError::InvalidParameter(
            "Invalid spike times: must be finite".to_string(),
        ));
    }

    Ok(superpose(
        spike_times,
        checked_num_samples(duration, frame_rate)?,
        frame_rate,
        kernel,
    ))
}

/// Sum the kernel responses to all spikes over the sampling grid `k / frame_rate`, for `k = 0, ..., num_samples - 1`.
fn superpose(
    spike_times: &[f64],
    num_samples: usize,
    frame_rate: f64,
    kernel: &KernelParameters,
) -> Vec<f64> {
    let grid: Vec<f64> = (0..num_samples).map(|k| k as f64 / frame_rate).collect();
    let mut trace = vec![0.0; num_samples];

    for &spike_time in spike_times {
        // samples before the spike receive nothing
        let start = grid.partition_point(|&t| t < spike_time);
        trace[start..]
            .iter_mut()
            .zip(grid[start..].iter())
            .for_each(|(value, &t)| *value += kernel.response(t - spike_time));
    }

    trace
}

/// Returns the noiseless traces of the population, one row per neuron.
pub fn clean_traces(
    spike_trains: &SpikeTrains,
    frame_rate: f64,
    kernel: &KernelParameters,
) -> Result<Traces, CalciumError> {
    validate_frame_rate(frame_rate)?;
    kernel.validate()?;
    Ok(signal(spike_trains, frame_rate, kernel))
}

fn signal(spike_trains: &SpikeTrains, frame_rate: f64, kernel: &KernelParameters) -> Traces {
    let num_samples = spike_trains.num_bins();
    let convert = |row: &[f64]| superpose(&bins_to_times(row, frame_rate), num_samples, frame_rate, kernel);

    let rows: Vec<&[f64]> = spike_trains.rows().collect();
    let values = if rows.len() >= MIN_NEURONS_PAR {
        rows.par_iter().map(|row| convert(*row)).collect()
    } else {
        rows.iter().map(|row| convert(*row)).collect()
    };

    Traces::new(values, num_samples)
}

/// Convert spike trains to calcium-like traces with the same shape.
///
/// Each neuron's trace is the sum of the kernel responses to its spikes, plus i.i.d. Gaussian noise with
/// standard deviation `kernel.peak_amplitude() / snr`. The noise is drawn from `rng` in row-major order
/// once all rows are computed. An infinite `snr` disables the noise.
///
/// # Errors
/// Returns [`CalciumError::InvalidParameter`] for a non-positive frame rate or signal-to-noise ratio,
/// or for an invalid kernel. Nothing is computed in that case.
pub fn synthesize_traces<R: Rng + ?Sized>(
    spike_trains: &SpikeTrains,
    frame_rate: f64,
    kernel: &KernelParameters,
    snr: f64,
    rng: &mut R,
) -> Result<Traces, CalciumError> {
    validate_frame_rate(frame_rate)?;
    let sigma = noise_std(kernel, snr)?;

    log::debug!(
        "Synthesizing {} traces of {} samples ({} spikes, noise std {})",
        spike_trains.num_neurons(),
        spike_trains.num_bins(),
        spike_trains.num_spikes(),
        sigma
    );

    let mut traces = signal(spike_trains, frame_rate, kernel);
    add_noise(&mut traces, sigma, rng);
    Ok(traces)
}

/// Same as [`synthesize_traces`], except that the noise of each row is drawn from its own generator,
/// `ChaCha8Rng::seed_from_u64(seed)` on stream `row`, so that rows can be processed in parallel.
pub fn synthesize_traces_sharded(
    spike_trains: &SpikeTrains,
    frame_rate: f64,
    kernel: &KernelParameters,
    snr: f64,
    seed: u64,
) -> Result<Traces, CalciumError> {
    validate_frame_rate(frame_rate)?;
    let sigma = noise_std(kernel, snr)?;

    log::debug!(
        "Synthesizing {} traces of {} samples with sharded noise (seed {}, noise std {})",
        spike_trains.num_neurons(),
        spike_trains.num_bins(),
        seed,
        sigma
    );

    let mut traces = signal(spike_trains, frame_rate, kernel);
    add_noise_sharded(&mut traces, sigma, seed);
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SEED: u64 = 42;

    #[test]
    fn test_num_samples() {
        assert_eq!(num_samples(1.0, 10.0), 10);
        assert_eq!(num_samples(0.3, 10.0), 3);
        assert_eq!(num_samples(0.35, 10.0), 4);
        assert_eq!(num_samples(0.0, 10.0), 0);
        assert_eq!(num_samples(2.5, 30.0), 75);
    }

    #[test]
    fn test_checked_num_samples() {
        assert_eq!(checked_num_samples(2.5, 30.0), Ok(75));
        assert_eq!(checked_num_samples(MAX_NUM_SAMPLES as f64, 1.0), Ok(MAX_NUM_SAMPLES));
        assert_eq!(
            checked_num_samples(1e20, 1e3),
            Err(CalciumError::InvalidParameter(format!(
                "Invalid duration value: more than {} samples",
                MAX_NUM_SAMPLES
            )))
        );
        assert!(times_to_trace(&[0.0], 1e300, 10.0, &KernelParameters::default()).is_err());
    }

    #[test]
    fn test_times_to_trace_single_spike() {
        let kernel = KernelParameters::single(0.01, 2.0, 0.5);
        let trace = times_to_trace(&[0.0], 1.0, 10.0, &kernel).unwrap();

        assert_eq!(trace.len(), 10);
        assert_eq!(trace[0], 0.0);
        assert!(trace.iter().all(|v| *v >= 0.0));
        trace.iter().enumerate().for_each(|(k, v)| {
            let t = k as f64 / 10.0;
            let expected = (1.0 - (-t / 0.01_f64).exp()) * 2.0 * (-t / 0.5_f64).exp();
            assert!((v - expected).abs() < 1e-12);
        });

        // rise then monotonic decay
        assert!(trace[1] > trace[0]);
        assert!(trace[1..].iter().tuple_windows().all(|(a, b)| a > b));
    }

    #[test]
    fn test_times_to_trace_no_spike() {
        let trace = times_to_trace(&[], 2.0, 20.0, &KernelParameters::default()).unwrap();
        assert_eq!(trace, vec![0.0; 40]);
    }

    #[test]
    fn test_times_to_trace_causality() {
        let kernel = KernelParameters::new(0.05, 1.0, 0.4, 0.5, 2.0);
        let trace = times_to_trace(&[0.55], 1.0, 100.0, &kernel).unwrap();
        assert!(trace[..55].iter().all(|v| *v == 0.0));
        assert!(trace[56..].iter().all(|v| *v > 0.0));

        // spikes after the recording do not contribute
        let trace = times_to_trace(&[5.0], 1.0, 100.0, &kernel).unwrap();
        assert!(trace.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_times_to_trace_additivity() {
        let kernel = KernelParameters::new(0.02, 1.0, 0.3, 0.4, 1.5);
        let first = times_to_trace(&[0.1], 2.0, 50.0, &kernel).unwrap();
        let second = times_to_trace(&[0.74], 2.0, 50.0, &kernel).unwrap();
        let both = times_to_trace(&[0.1, 0.74], 2.0, 50.0, &kernel).unwrap();

        assert_eq!(both.len(), 100);
        both.iter()
            .zip_eq(first.iter().zip_eq(second.iter()))
            .for_each(|(b, (f, s))| assert!((b - (f + s)).abs() < 1e-12));
    }

    #[test]
    fn test_times_to_trace_spike_before_recording() {
        // a spike before time 0 still contributes its decay
        let kernel = KernelParameters::default();
        let trace = times_to_trace(&[-0.2], 1.0, 10.0, &kernel).unwrap();
        assert!((trace[0] - kernel.response(0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_times_to_trace_invalid_parameters() {
        let kernel = KernelParameters::default();
        assert_eq!(
            times_to_trace(&[0.0], 1.0, 0.0, &kernel),
            Err(CalciumError::InvalidParameter(
                "Invalid frame rate value: must be positive".to_string()
            ))
        );
        assert_eq!(
            times_to_trace(&[0.0], -1.0, 10.0, &kernel),
            Err(CalciumError::InvalidParameter(
                "Invalid duration value: must be non-negative".to_string()
            ))
        );
        assert_eq!(
            times_to_trace(&[f64::NAN], 1.0, 10.0, &kernel),
            Err(CalciumError::InvalidParameter(
                "Invalid spike times: must be finite".to_string()
            ))
        );
        assert!(times_to_trace(&[0.0], 1.0, 10.0, &KernelParameters::single(0.01, 2.0, 0.0)).is_err());
    }

    #[test]
    fn test_clean_traces() {
        let spike_trains = SpikeTrains::build(vec![
            vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0; 10],
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let kernel = KernelParameters::default();
        let traces = clean_traces(&spike_trains, 10.0, &kernel).unwrap();

        assert_eq!(traces.shape(), (3, 10));
        assert_eq!(
            traces.row(0).unwrap(),
            times_to_trace(&[0.0], 1.0, 10.0, &kernel).unwrap().as_slice()
        );
        assert!(traces.row(1).unwrap().iter().all(|v| *v == 0.0));
        assert_eq!(
            traces.row(2).unwrap(),
            times_to_trace(&[0.3, 0.6], 1.0, 10.0, &kernel).unwrap().as_slice()
        );
    }

    #[test]
    fn test_clean_traces_parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let bins: Vec<Vec<f64>> = (0..MIN_NEURONS_PAR * 3)
            .map(|_| (0..200).map(|_| if rng.gen_bool(0.05) { 1.0 } else { 0.0 }).collect())
            .collect();
        let kernel = KernelParameters::new(0.02, 1.0, 0.3, 0.4, 1.5);

        let all = clean_traces(&SpikeTrains::build(bins.clone()).unwrap(), 30.0, &kernel).unwrap();
        for (i, row) in bins.into_iter().enumerate() {
            let single = clean_traces(&SpikeTrains::build(vec![row]).unwrap(), 30.0, &kernel).unwrap();
            assert_eq!(all.row(i), single.row(0));
        }
    }

    #[test]
    fn test_synthesize_traces_noiseless() {
        let spike_trains = SpikeTrains::build(vec![vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]]).unwrap();
        let kernel = KernelParameters::default();
        let mut rng = StdRng::seed_from_u64(SEED);

        let traces = synthesize_traces(&spike_trains, 10.0, &kernel, f64::INFINITY, &mut rng).unwrap();
        assert_eq!(traces, clean_traces(&spike_trains, 10.0, &kernel).unwrap());
    }

    #[test]
    fn test_synthesize_traces_reproducible() {
        let spike_trains = SpikeTrains::build(vec![vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0]; 3]).unwrap();
        let kernel = KernelParameters::default();

        let first = synthesize_traces(&spike_trains, 10.0, &kernel, 5.0, &mut StdRng::seed_from_u64(SEED)).unwrap();
        let second = synthesize_traces(&spike_trains, 10.0, &kernel, 5.0, &mut StdRng::seed_from_u64(SEED)).unwrap();
        let other = synthesize_traces(&spike_trains, 10.0, &kernel, 5.0, &mut StdRng::seed_from_u64(SEED + 1)).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(first.values().all(|v| v.is_finite()));
    }

    #[test]
    fn test_synthesize_traces_invalid_parameters() {
        let spike_trains = SpikeTrains::silent(2, 10);
        let kernel = KernelParameters::default();
        let mut rng = StdRng::seed_from_u64(SEED);

        assert_eq!(
            synthesize_traces(&spike_trains, -10.0, &kernel, 10.0, &mut rng),
            Err(CalciumError::InvalidParameter(
                "Invalid frame rate value: must be positive".to_string()
            ))
        );
        assert_eq!(
            synthesize_traces(&spike_trains, 10.0, &kernel, 0.0, &mut rng),
            Err(CalciumError::InvalidParameter(
                "Invalid snr value: must be positive".to_string()
            ))
        );
        assert_eq!(
            synthesize_traces(&spike_trains, 10.0, &KernelParameters::single(0.0, 2.0, 0.5), 10.0, &mut rng),
            Err(CalciumError::InvalidParameter(
                "Invalid tau_onset value: must be positive".to_string()
            ))
        );
    }

    #[test]
    fn test_synthesize_traces_sharded() {
        let spike_trains = SpikeTrains::build(vec![vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0]; 12]).unwrap();
        let kernel = KernelParameters::default();

        let first = synthesize_traces_sharded(&spike_trains, 10.0, &kernel, 5.0, SEED).unwrap();
        let second = synthesize_traces_sharded(&spike_trains, 10.0, &kernel, 5.0, SEED).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.shape(), (12, 6));
        // identical signals, independent noise
        assert_ne!(first.row(0), first.row(1));

        let noiseless = synthesize_traces_sharded(&spike_trains, 10.0, &kernel, f64::INFINITY, SEED).unwrap();
        assert_eq!(noiseless, clean_traces(&spike_trains, 10.0, &kernel).unwrap());
    }
}
