//! This crate provides tools for simulating calcium-imaging recordings from spike trains in Rust.
//!
//! Each action potential elicits a fluorescence transient (ΔF/F) with a fast rise and a one- or
//! two-exponential decay. Transients of a neuron add up linearly and Gaussian measurement noise,
//! calibrated on the transient peak and a signal-to-noise ratio, is added on top.
//!
//! # Synthesizing Traces
//!
//! ```rust
//! use rusty_calcium::core::kernel::KernelParameters;
//! use rusty_calcium::core::spike_train::SpikeTrains;
//! use rusty_calcium::core::synthesizer::synthesize_traces;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // A single neuron firing at t=0s, recorded at 10 Hz for 1 second
//! let mut bins = vec![vec![0.0; 10]];
//! bins[0][0] = 1.0;
//! let spike_trains = SpikeTrains::build(bins).unwrap();
//!
//! // Without noise, the trace is the kernel sampled every 0.1s
//! let mut rng = StdRng::seed_from_u64(42);
//! let kernel = KernelParameters::default();
//! let traces = synthesize_traces(&spike_trains, 10.0, &kernel, f64::INFINITY, &mut rng).unwrap();
//!
//! assert_eq!(traces.shape(), (1, 10));
//! assert_eq!(traces.row(0).unwrap()[0], 0.0);
//! assert!((traces.row(0).unwrap()[1] - kernel.response(0.1)).abs() < 1e-12);
//! ```
//!
//! # Sampling Spike Trains
//!
//! ```rust
//! use rusty_calcium::core::kernel::KernelParameters;
//! use rusty_calcium::core::synthesizer::synthesize_traces;
//! use rusty_calcium::sampler::spike_train::generate_spike_trains;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // 50 neurons firing at 0.5 Hz, recorded at 30 Hz for 60 seconds
//! let mut rng = StdRng::seed_from_u64(42);
//! let spike_trains = generate_spike_trains(0.5, 60.0, 50, 30.0, &mut rng).unwrap();
//! let traces = synthesize_traces(&spike_trains, 30.0, &KernelParameters::default(), 10.0, &mut rng).unwrap();
//!
//! assert_eq!(traces.shape(), (50, 1800));
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod plot;
pub mod sampler;
