//! Figures of calcium traces with their spike trains.
//!
//! Each panel shows the trace of a neuron (for at most [`MAX_PANELS`] neurons), with a tick at the bottom
//! for each spike. Panels share the time axis, labelled in seconds.
//!
//! Tick labels and captions are only rendered when the `fonts` feature is enabled.
use std::fs;
use std::path::PathBuf;

use log;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::core::spike_train::SpikeTrains;
use crate::core::synthesizer::validate_frame_rate;
use crate::core::trace::Traces;
use crate::error::CalciumError;

/// The resolution of the figure when none is provided.
pub const DEFAULT_DPI: u32 = 240;
/// The maximum number of neurons shown in a figure.
pub const MAX_PANELS: usize = 4;
/// The size of the figure in inches.
const FIGURE_SIZE: (f64, f64) = (6.0, 4.0);
/// The relative height of a spike tick in a panel.
const SPIKE_TICK_HEIGHT: f64 = 0.1;

/// Whether tick labels and captions are drawn.
const WITH_TEXT: bool = cfg!(feature = "fonts");

const TRACE_COLOR: RGBColor = RGBColor(255, 69, 0);
const SPIKE_COLOR: RGBColor = RGBColor(33, 37, 41);

/// Where and how to render a figure.
#[derive(Debug, PartialEq, Clone)]
pub struct PlotOptions {
    /// The PNG file to write; missing parent directories are created.
    /// Without a file, the figure is only rendered in memory.
    pub filename: Option<PathBuf>,
    /// The resolution of the figure, in pixels per inch.
    pub dpi: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            filename: None,
            dpi: DEFAULT_DPI,
        }
    }
}

/// The size of the figure in pixels.
pub fn figure_size(dpi: u32) -> (u32, u32) {
    (
        (FIGURE_SIZE.0 * dpi as f64).round() as u32,
        (FIGURE_SIZE.1 * dpi as f64).round() as u32,
    )
}

fn validate(
    traces: &Traces,
    spike_trains: &SpikeTrains,
    frame_rate: f64,
    dpi: u32,
) -> Result<(), CalciumError> {
    validate_frame_rate(frame_rate)?;

    if dpi == 0 {
        return Err(CalciumError::InvalidParameter(
            "Invalid dpi value: must be positive".to_string(),
        ));
    }

    if traces.shape() != spike_trains.shape() {
        return Err(CalciumError::InvalidShape(format!(
            "traces {:?} and spike trains {:?} should have the same shape",
            traces.shape(),
            spike_trains.shape()
        )));
    }

    Ok(())
}

/// Render the figure and save it if a filename is provided.
pub fn plot_traces(
    traces: &Traces,
    spike_trains: &SpikeTrains,
    frame_rate: f64,
    options: &PlotOptions,
) -> Result<(), CalciumError> {
    match &options.filename {
        Some(filename) => {
            validate(traces, spike_trains, frame_rate, options.dpi)?;

            if let Some(dirname) = filename.parent() {
                if !dirname.as_os_str().is_empty() && !dirname.exists() {
                    fs::create_dir_all(dirname)?;
                }
            }

            let root = BitMapBackend::new(filename, figure_size(options.dpi)).into_drawing_area();
            draw_panels(&root, traces, spike_trains, frame_rate)
                .and_then(|_| root.present())
                .map_err(|e| CalciumError::IOError(format!("Failed to draw figure: {}", e)))?;

            log::info!("plot saved to {}", filename.display());
            Ok(())
        }
        None => render_traces(traces, spike_trains, frame_rate, options.dpi).map(|_| ()),
    }
}

/// Render the figure in memory. Returns the RGB pixels, row by row.
pub fn render_traces(
    traces: &Traces,
    spike_trains: &SpikeTrains,
    frame_rate: f64,
    dpi: u32,
) -> Result<Vec<u8>, CalciumError> {
    validate(traces, spike_trains, frame_rate, dpi)?;

    let (width, height) = figure_size(dpi);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_panels(&root, traces, spike_trains, frame_rate)
            .and_then(|_| root.present())
            .map_err(|e| CalciumError::IOError(format!("Failed to draw figure: {}", e)))?;
    }

    Ok(buffer)
}

/// The vertical range of a panel, with some padding, and its three ticks from `0.9 * min` to `max`.
fn y_axis(signal: &[f64]) -> (f64, f64, f64, Vec<f64>) {
    let s_min = signal.iter().cloned().fold(f64::INFINITY, f64::min);
    let s_max = signal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !s_min.is_finite() || !s_max.is_finite() {
        return (0.0, -0.5, 0.5, vec![-0.5, 0.0, 0.5]);
    }

    let low = 0.9 * s_min;
    let ticks = vec![low, 0.5 * (low + s_max), s_max];

    let (lo, hi) = (low.min(s_min), s_max.max(low));
    let pad = if hi > lo { 0.05 * (hi - lo) } else { 0.5 };
    (s_min, lo - pad, hi + pad, ticks)
}

fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    traces: &Traces,
    spike_trains: &SpikeTrains,
    frame_rate: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let num_panels = traces.num_neurons().min(MAX_PANELS);
    let x_max = traces.num_samples().max(1) as f64;
    let x_formatter = |x: &f64| format!("{}", (*x / frame_rate) as i64);
    let y_formatter = |y: &f64| format!("{:.1}", y);

    for (i, (panel, (signal, spikes))) in root
        .split_evenly((num_panels.max(1), 1))
        .iter()
        .zip(traces.rows().zip(spike_trains.rows()))
        .take(num_panels)
        .enumerate()
    {
        let is_last = i + 1 == num_panels;
        let (s_min, y_lo, y_hi, y_ticks) = y_axis(signal);

        let mut chart = ChartBuilder::on(panel)
            .margin(5)
            .x_label_area_size(if WITH_TEXT && is_last { 30 } else { 0 })
            .y_label_area_size(if WITH_TEXT { 40 } else { 0 })
            .build_cartesian_2d(0.0..x_max, (y_lo..y_hi).with_key_points(y_ticks))?;

        if WITH_TEXT {
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .x_labels(5)
                .x_label_formatter(&x_formatter)
                .y_labels(3)
                .y_label_formatter(&y_formatter);
            if is_last {
                mesh.x_desc("Time (s)");
            }
            if i == num_panels / 2 {
                mesh.y_desc("ΔF/F");
            }
            mesh.draw()?;
        } else {
            // plotters panics when drawing text without a font backend, so only the axes are drawn
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(0.0, y_hi), (0.0, y_lo), (x_max, y_lo)],
                BLACK.stroke_width(1),
            )))?;
        }

        chart.draw_series(LineSeries::new(
            signal.iter().enumerate().map(|(k, v)| (k as f64, *v)),
            TRACE_COLOR.stroke_width(1),
        ))?;

        let tick = SPIKE_TICK_HEIGHT * (y_hi - y_lo);
        chart.draw_series(
            spikes
                .iter()
                .enumerate()
                .filter(|(_, b)| **b != 0.0)
                .map(|(k, _)| {
                    PathElement::new(
                        vec![(k as f64, s_min - tick / 2.0), (k as f64, s_min + tick / 2.0)],
                        SPIKE_COLOR.stroke_width(2),
                    )
                }),
        )?;
    }

    Ok(())
}
