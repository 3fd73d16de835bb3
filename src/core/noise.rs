//! Gaussian measurement noise calibrated on the kernel peak.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

use crate::core::kernel::KernelParameters;
use crate::core::trace::Traces;
use crate::core::MIN_NEURONS_PAR;
use crate::error::CalciumError;

/// Check the signal-to-noise ratio is positive. An infinite ratio disables the noise.
pub fn validate_snr(snr: f64) -> Result<(), CalciumError> {
    if snr.is_nan() || snr <= 0.0 {
        return Err(CalciumError::InvalidParameter(
            "Invalid snr value: must be positive".to_string(),
        ));
    }
    Ok(())
}

/// The standard deviation of the noise, i.e., the peak amplitude of the kernel divided by the signal-to-noise ratio.
pub fn noise_std(kernel: &KernelParameters, snr: f64) -> Result<f64, CalciumError> {
    kernel.validate()?;
    validate_snr(snr)?;

    let sigma = kernel.peak_amplitude() / snr;
    if !sigma.is_finite() {
        return Err(CalciumError::InvalidParameter(
            "Invalid snr value: noise level is not finite".to_string(),
        ));
    }
    Ok(sigma)
}

/// Add i.i.d. zero-mean Gaussian noise with standard deviation `sigma` to every value.
/// Samples are drawn from `rng` in row-major order; nothing is drawn if `sigma` is zero.
pub fn add_noise<R: Rng + ?Sized>(traces: &mut Traces, sigma: f64, rng: &mut R) {
    if sigma == 0.0 {
        return;
    }
    for row in traces.rows_mut().iter_mut() {
        for value in row.iter_mut() {
            let z: f64 = StandardNormal.sample(rng);
            *value += sigma * z;
        }
    }
}

/// Add i.i.d. zero-mean Gaussian noise with standard deviation `sigma` to every value.
/// The noise of row `i` is drawn from `ChaCha8Rng::seed_from_u64(seed)` on stream `i`,
/// hence the result does not depend on how rows are scheduled.
pub fn add_noise_sharded(traces: &mut Traces, sigma: f64, seed: u64) {
    if sigma == 0.0 {
        return;
    }

    let add_row_noise = |(i, row): (usize, &mut Vec<f64>)| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(i as u64);
        row.iter_mut().for_each(|value| {
            let z: f64 = StandardNormal.sample(&mut rng);
            *value += sigma * z;
        });
    };

    let rows = traces.rows_mut();
    if rows.len() >= MIN_NEURONS_PAR {
        rows.par_iter_mut().enumerate().for_each(add_row_noise);
    } else {
        rows.iter_mut().enumerate().for_each(add_row_noise);
    }
}
