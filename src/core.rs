//! Core module defining the spike-to-calcium conversion model.
//!
//! It consists of the following components:
//!
//! - [`kernel`]: The single-spike response of the indicator and its peak amplitude
//! - [`spike_train`]: Binned spike trains (neurons x time-bins) and spike-time extraction
//! - [`trace`]: The synthesized ΔF/F traces
//! - [`noise`]: Calibration and injection of the Gaussian measurement noise
//! - [`synthesizer`]: Per-neuron superposition of kernels and the batch entry points
//!
//! # Examples
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rusty_calcium::core::kernel::KernelParameters;
//! use rusty_calcium::core::spike_train::SpikeTrains;
//! use rusty_calcium::core::synthesizer::synthesize_traces;
//!
//! // Two neurons recorded at 10 Hz for 1 second
//! let spike_trains = SpikeTrains::build(vec![
//!     vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
//!     vec![0.0; 10],
//! ])
//! .unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let traces = synthesize_traces(&spike_trains, 10.0, &KernelParameters::default(), 10.0, &mut rng).unwrap();
//!
//! assert_eq!(traces.shape(), (2, 10));
//! ```
pub mod kernel;
pub mod noise;
pub mod spike_train;
pub mod synthesizer;
pub mod trace;

/// The signal-to-noise ratio used when none is provided.
pub const DEFAULT_SNR: f64 = 10.0;
/// Minimum number of neurons to parallelize the computation.
pub const MIN_NEURONS_PAR: usize = 10;
