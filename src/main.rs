use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use rusty_calcium::config::SimulationConfig;
use rusty_calcium::core::kernel::KernelParameters;
use rusty_calcium::core::spike_train::SpikeTrains;
use rusty_calcium::core::synthesizer::{synthesize_traces, synthesize_traces_sharded};
use rusty_calcium::core::trace::Traces;
use rusty_calcium::plot::{plot_traces, PlotOptions, DEFAULT_DPI};
use rusty_calcium::sampler::spike_train::generate_spike_trains;

#[derive(Parser, Debug)]
struct Args {
    /// A JSON configuration file; when provided, the simulation flags below are ignored
    #[arg(long)]
    config: Option<PathBuf>,
    /// The seed used for spike train and noise sampling
    #[arg(long, default_value = "42")]
    seed: u64,
    /// The number of neurons
    #[arg(short = 'N', long, default_value = "4")]
    num_neurons: usize,
    /// The duration of the recording (in seconds)
    #[arg(short = 'T', long, default_value = "60.0")]
    duration: f64,
    /// The frame rate of the recording (in Hz)
    #[arg(long, default_value = "30.0")]
    frame_rate: f64,
    /// The firing rate of the neurons (in Hz)
    #[arg(long, default_value = "0.5")]
    firing_rate: f64,
    /// The signal-to-noise ratio
    #[arg(long, default_value = "10.0")]
    snr: f64,
    /// The onset time constant of the indicator (in seconds)
    #[arg(long, default_value = "0.01")]
    tau_onset: f64,
    /// The single spike amplitude (ΔF/F)
    #[arg(long, default_value = "2.0")]
    amp1: f64,
    /// The decay time constant of the indicator (in seconds)
    #[arg(long, default_value = "0.5")]
    tau1: f64,
    /// The amplitude of the second decay
    #[arg(long, default_value = "0.0")]
    amp2: f64,
    /// The time constant of the second decay (in seconds)
    #[arg(long, default_value = "0.0")]
    tau2: f64,
    /// Draw the noise of each neuron from its own generator, in parallel
    #[arg(long)]
    sharded: bool,
    /// Where to write the spike trains and traces (JSON)
    #[arg(long)]
    traces: Option<PathBuf>,
    /// Where to write the figure (PNG)
    #[arg(long)]
    plot: Option<PathBuf>,
    /// The resolution of the figure
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,
    /// The logging level
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig, Box<dyn Error>> {
        let config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig {
                frame_rate: self.frame_rate,
                duration: self.duration,
                num_neurons: self.num_neurons,
                firing_rate: self.firing_rate,
                snr: self.snr,
                seed: self.seed,
                kernel: KernelParameters::new(self.tau_onset, self.amp1, self.tau1, self.amp2, self.tau2),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct Recording<'a> {
    config: &'a SimulationConfig,
    spike_trains: &'a SpikeTrains,
    traces: &'a Traces,
}

fn init_logging(level: LevelFilter) -> Result<(), Box<dyn Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    let config = args.simulation_config()?;
    log::info!("Simulation configuration: {:?}", config);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let spike_trains = generate_spike_trains(
        config.firing_rate,
        config.duration,
        config.num_neurons,
        config.frame_rate,
        &mut rng,
    )?;
    log::info!(
        "{} spikes sampled over {} neurons and {} frames",
        spike_trains.num_spikes(),
        spike_trains.num_neurons(),
        spike_trains.num_bins()
    );

    let traces = if args.sharded {
        synthesize_traces_sharded(
            &spike_trains,
            config.frame_rate,
            &config.kernel,
            config.snr,
            config.seed,
        )?
    } else {
        synthesize_traces(
            &spike_trains,
            config.frame_rate,
            &config.kernel,
            config.snr,
            &mut rng,
        )?
    };
    log::info!("Traces successfully synthesized");

    if let Some(path) = &args.traces {
        if let Some(dirname) = path.parent() {
            if !dirname.as_os_str().is_empty() {
                fs::create_dir_all(dirname)?;
            }
        }
        let recording = Recording {
            config: &config,
            spike_trains: &spike_trains,
            traces: &traces,
        };
        serde_json::to_writer(BufWriter::new(File::create(path)?), &recording)?;
        log::info!("traces saved to {}", path.display());
    }

    if let Some(path) = &args.plot {
        let options = PlotOptions {
            filename: Some(path.clone()),
            dpi: args.dpi,
        };
        plot_traces(&traces, &spike_trains, config.frame_rate, &options)?;
    }

    Ok(())
}
