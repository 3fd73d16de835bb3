//! Module for sampling synthetic inputs of the synthesizer.
//!
//! This module provides functionality for sampling:
//! - Binned spike trains via the [`spike_train`] module
pub mod spike_train;
