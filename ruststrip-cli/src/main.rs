//!
//! Command-line driver for the strip-readout processing pipeline.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Args, Parser, Subcommand};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use ruststrip_algorithms::{calibrate_run, process_event};
use ruststrip_core::{
    ChannelMask, ChannelRange, ClusteringConfig, CommonModeConfig, CommonModeMode,
    PipelineContext, Polarity, RawFrame, Topology,
};
use ruststrip_io::{CalibrationStore, ClusterWriter, FrameReader};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    RuststripIo(#[from] ruststrip_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] ruststrip_core::Error),
}

/// Readout shape and channel mask, shared by all subcommands.
#[derive(Args, Debug)]
struct TopologyArgs {
    /// Number of readout chips
    #[arg(long, default_value = "2")]
    chips: usize,

    /// Number of channels per chip
    #[arg(long, default_value = "128")]
    channels: usize,

    /// Usable channel range 'chip:first-last' (repeatable; channels not
    /// covered by any range are masked; omit to use every channel)
    #[arg(long = "range")]
    ranges: Vec<String>,
}

impl TopologyArgs {
    fn topology(&self) -> Topology {
        Topology::new(self.chips, self.channels)
    }

    /// Builds the channel mask, falling back to "use all channels" when
    /// no usable range configuration survives validation.
    fn mask(&self, topology: Topology) -> ChannelMask {
        if self.ranges.is_empty() {
            return ChannelMask::none(topology);
        }

        let mut valid = Vec::with_capacity(self.ranges.len());
        for raw in &self.ranges {
            match raw.parse::<ChannelRange>() {
                Ok(range) => valid.push(range),
                Err(err) => eprintln!("Ignoring channel range: {err}"),
            }
        }

        match ChannelMask::from_ranges(topology, &valid) {
            Ok(mask) => mask,
            Err(err) => {
                eprintln!("Invalid mask configuration ({err}); using all channels");
                ChannelMask::none(topology)
            }
        }
    }
}

/// Per-event processing configuration, shared by `process`.
#[derive(Args, Debug)]
struct ProcessingArgs {
    /// Minimum SNR for a cluster seed
    #[arg(long, default_value = "3.0")]
    seed_cut: f64,

    /// Minimum SNR for a cluster member
    #[arg(long, default_value = "2.0")]
    neighbor_cut: f64,

    /// Signal polarity: '+1' or '-1'
    #[arg(long, default_value = "-1")]
    polarity: String,

    /// Sensitive axis of the sensor is Y instead of X
    #[arg(long)]
    axis_y: bool,

    /// Common-mode outlier-rejection iterations
    #[arg(long, default_value = "3")]
    iterations: usize,

    /// Common-mode rejection threshold in standard deviations
    #[arg(long, default_value = "2.5")]
    noise_deviation: f64,

    /// Common-mode shape: 'constant' or 'slope'
    #[arg(long, default_value = "slope")]
    common_mode: String,
}

impl ProcessingArgs {
    /// Resolves the configuration, falling back to defaults for
    /// unparsable mode values.
    fn context(&self, topology: Topology, mask: ChannelMask) -> PipelineContext {
        let polarity = self.polarity.parse::<Polarity>().unwrap_or_else(|err| {
            eprintln!("{err}; using negative polarity");
            Polarity::Negative
        });
        let mode = self.common_mode.parse::<CommonModeMode>().unwrap_or_else(|err| {
            eprintln!("{err}; using slope mode");
            CommonModeMode::default()
        });

        PipelineContext::new(topology, mask)
            .with_clustering(
                ClusteringConfig::new()
                    .with_seed_cut(self.seed_cut)
                    .with_neighbor_cut(self.neighbor_cut)
                    .with_polarity(polarity)
                    .with_sensitive_axis_x(!self.axis_y),
            )
            .with_common_mode(
                CommonModeConfig::new()
                    .with_iterations(self.iterations)
                    .with_noise_deviation(self.noise_deviation)
                    .with_mode(mode),
            )
    }
}

/// Strip-readout calibration and clustering.
#[derive(Parser)]
#[command(name = "ruststrip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute pedestal and noise tables from a calibration run
    Calibrate {
        /// Input frame file
        input: PathBuf,

        /// Calibration store directory
        #[arg(short, long, default_value = "calibration")]
        store: PathBuf,

        /// Run identifier the tables are stored under
        #[arg(short, long)]
        run: String,

        #[command(flatten)]
        topology: TopologyArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Process a run into clusters using stored calibration
    Process {
        /// Input frame file
        input: PathBuf,

        /// Output cluster file (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Calibration store directory
        #[arg(short, long, default_value = "calibration")]
        store: PathBuf,

        /// Run identifier the calibration was stored under
        #[arg(short, long)]
        run: String,

        #[command(flatten)]
        topology: TopologyArgs,

        #[command(flatten)]
        processing: ProcessingArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a frame file
    Info {
        /// Input frame file
        input: PathBuf,

        #[command(flatten)]
        topology: TopologyArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calibrate {
            input,
            store,
            run,
            topology,
            verbose,
        } => {
            let topo = topology.topology();
            let mask = topology.mask(topo);
            let ctx = PipelineContext::new(topo, mask);

            if verbose {
                eprintln!("Calibrating run '{}' from {}", run, input.display());
                eprintln!(
                    "Topology: {} chips x {} channels, {} masked",
                    topo.chips,
                    topo.channels,
                    ctx.mask().masked_count()
                );
            }

            let start = Instant::now();
            let frames = FrameReader::open(&input, topo)?.read_all()?;
            let summary = calibrate_run(frames, &ctx);

            for (event, err) in &summary.skipped {
                eprintln!("Skipped frame in event {}: {}", event, err);
            }

            let store = CalibrationStore::open(&store)?;
            store.put(&run, &summary.tables.pedestals, &summary.tables.noise)?;

            println!(
                "Calibrated {} frames in {:.2}s ({} skipped)",
                summary.frames_used,
                start.elapsed().as_secs_f64(),
                summary.skipped.len()
            );
        }

        Commands::Process {
            input,
            output,
            store,
            run,
            topology,
            processing,
            verbose,
        } => {
            let topo = topology.topology();
            let mask = topology.mask(topo);
            let ctx = processing.context(topo, mask);

            let store = CalibrationStore::open(&store)?;
            let (pedestals, noise) = store.get(&run, topo)?;

            if verbose {
                eprintln!("Processing {} with run '{}' calibration", input.display(), run);
            }

            let start = Instant::now();
            let mut events: BTreeMap<u64, Vec<RawFrame>> = BTreeMap::new();
            for frame in FrameReader::open(&input, topo)? {
                let frame = frame?;
                events.entry(frame.event).or_default().push(frame);
            }

            let mut writer = ClusterWriter::create(&output)?;
            let mut total_clusters = 0usize;
            let event_count = events.len();

            for (event, frames) in events {
                let result = process_event(&frames, &pedestals, &noise, &ctx);
                for (chip, err) in &result.skipped {
                    eprintln!("Event {}: skipped chip {}: {}", event, chip, err);
                }
                let clusters: Vec<_> = result.clusters().cloned().collect();
                total_clusters += clusters.len();
                writer.write_event_csv(event, &clusters)?;
            }

            println!(
                "Processed {} events in {:.2}s",
                event_count,
                start.elapsed().as_secs_f64()
            );
            println!("Total clusters: {}", total_clusters);
            println!("Output: {}", output.display());
        }

        Commands::Info { input, topology } => {
            let topo = topology.topology();
            let mut frames = 0usize;
            let mut events: BTreeMap<u64, usize> = BTreeMap::new();
            let mut min_sample = f64::INFINITY;
            let mut max_sample = f64::NEG_INFINITY;

            for frame in FrameReader::open(&input, topo)? {
                let frame = frame?;
                frames += 1;
                *events.entry(frame.event).or_default() += 1;
                for &sample in &frame.samples {
                    min_sample = min_sample.min(sample);
                    max_sample = max_sample.max(sample);
                }
            }

            println!("File: {}", input.display());
            println!("Frames: {}", frames);
            println!("Events: {}", events.len());
            if frames > 0 {
                println!("Sample range: {} - {}", min_sample, max_sample);
                let uneven = events.values().any(|&count| count != topo.chips);
                if uneven {
                    println!("Warning: some events do not cover all {} chips", topo.chips);
                }
            }
        }
    }

    Ok(())
}
