//! The response of a calcium indicator to a single action potential.
use serde::{Deserialize, Serialize};

use crate::error::CalciumError;

/// Parameters of the double-exponential kernel.
///
/// The response to a spike at time 0 is, for `t >= 0`,
/// `(1 - exp(-t / tau_onset)) * (amp1 * exp(-t / tau1) + amp2 * exp(-t / tau2))`
/// and zero before. Setting `amp2 = tau2 = 0` gives a single-exponential decay.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelParameters {
    /// The onset (rise) time constant in seconds.
    pub tau_onset: f64,
    /// The single spike amplitude (ΔF/F) of the first decay.
    pub amp1: f64,
    /// The decay time constant of the first exponential in seconds.
    pub tau1: f64,
    /// The amplitude of the second decay.
    pub amp2: f64,
    /// The decay time constant of the second exponential in seconds.
    pub tau2: f64,
}

impl Default for KernelParameters {
    fn default() -> Self {
        KernelParameters {
            tau_onset: 0.01,
            amp1: 2.0,
            tau1: 0.5,
            amp2: 0.0,
            tau2: 0.0,
        }
    }
}

impl KernelParameters {
    pub fn new(tau_onset: f64, amp1: f64, tau1: f64, amp2: f64, tau2: f64) -> Self {
        KernelParameters {
            tau_onset,
            amp1,
            tau1,
            amp2,
            tau2,
        }
    }

    /// Single-exponential kernel, i.e., without second decay.
    pub fn single(tau_onset: f64, amp1: f64, tau1: f64) -> Self {
        KernelParameters::new(tau_onset, amp1, tau1, 0.0, 0.0)
    }

    /// Check the parameters define a valid kernel.
    /// The onset and first decay time constants must be positive, the second decay time constant non-negative.
    pub fn validate(&self) -> Result<(), CalciumError> {
        let values = [
            ("tau_onset", self.tau_onset),
            ("amp1", self.amp1),
            ("tau1", self.tau1),
            ("amp2", self.amp2),
            ("tau2", self.tau2),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CalciumError::InvalidParameter(format!(
                "Invalid {} value: must be finite",
                name
            )));
        }

        if self.tau_onset <= 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid tau_onset value: must be positive".to_string(),
            ));
        }

        if self.tau1 <= 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid tau1 value: must be positive".to_string(),
            ));
        }

        if self.tau2 < 0.0 {
            return Err(CalciumError::InvalidParameter(
                "Invalid tau2 value: must be non-negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Evaluate the (ungated) kernel at `dt` seconds after the spike.
    /// The result may be non-finite, e.g., at `dt = 0` with `tau2 = 0`.
    pub fn eval(&self, dt: f64) -> f64 {
        (1.0 - (-dt / self.tau_onset).exp())
            * (self.amp1 * (-dt / self.tau1).exp() + self.amp2 * (-dt / self.tau2).exp())
    }

    /// The response at `dt` seconds after the spike.
    /// It is zero before the spike, and non-finite values are flushed to zero.
    pub fn response(&self, dt: f64) -> f64 {
        if dt < 0.0 {
            return 0.0;
        }
        let value = self.eval(dt);
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    /// The peak of the response to an isolated spike, used to calibrate the noise level.
    ///
    /// Only the first exponential is taken into account: with `r = tau1 / tau_onset`,
    /// the peak is `amp1 * r * (r + 1)^(-(1 / r + 1))`.
    pub fn peak_amplitude(&self) -> f64 {
        let ratio = self.tau1 / self.tau_onset;
        self.amp1 * (ratio * (ratio + 1.0).powf(-(self.tau_onset / self.tau1 + 1.0)))
    }
}
