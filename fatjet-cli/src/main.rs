//! fatjet command-line interface.
//!
//! Runs the jet selection over JSON-lines event files and post-processes
//! its output.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use fatjet_algorithms::{
    merge_statistics, reference_bin_count, select_events, select_events_flat_mass,
    FeatureScaling, MassFlattener, SelectionStatistics,
};
use fatjet_core::{Event, FlatMassConfig, Process, SelectionConfig};
use fatjet_io::{split_selection, EventReader, SelectionReader, SelectionWriter, SplitMode};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    FatjetIo(#[from] fatjet_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] fatjet_core::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

/// Mass window whose unflattened count sets the default per-bin cap.
const REFERENCE_BIN: (f32, f32) = (245.0, 250.0);

/// Settings read from `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    selection: SelectionConfig,
    flat_mass: FlatMassConfig,
}

/// Labelling used by `split`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SplitKind {
    /// Top_bqq, Top_bq and Top_qq by decay topology
    Top,
    /// QCD_light, QCD_c and QCD_b by hadron flavour
    Qcd,
}

impl From<SplitKind> for SplitMode {
    fn from(kind: SplitKind) -> Self {
        match kind {
            SplitKind::Top => SplitMode::Top,
            SplitKind::Qcd => SplitMode::Qcd,
        }
    }
}

/// Large-radius jet selection and truth labelling.
#[derive(Parser)]
#[command(name = "fatjet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with `selection` and `flat_mass` settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select jets from event files
    Select {
        /// Input event file(s), JSON lines
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Process name or sample name (e.g. TTto4Q, QCD_HT1000, GluGluHto2B)
        #[arg(short, long)]
        process: String,

        /// Jets kept per event
        #[arg(long)]
        max_jets: Option<usize>,
    },

    /// Select jets with a flat mass spectrum
    FlatMass {
        /// Input event file(s), JSON lines
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Per-bin cap (default: jet count in the 245-250 GeV bin)
        #[arg(long)]
        max_per_bin: Option<u64>,

        /// Histogram output (.csv, or .h5 with the hdf5 feature)
        #[arg(long)]
        histogram: Option<PathBuf>,
    },

    /// Split selection output into one jet file per category
    Split {
        /// Selection output of a top or QCD sample
        input: PathBuf,

        /// Directory for the per-category files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Split by top topology or by QCD hadron flavour
        #[arg(short, long, value_enum, default_value_t = SplitKind::Top)]
        mode: SplitKind,
    },

    /// Compute per-feature mean and std of the jet neuron vectors
    Scaling {
        /// Selection output with neuron vectors
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum number of jets used
        #[arg(long)]
        max_jets: Option<usize>,
    },

    /// Show information about an event file
    Info {
        /// Input event file
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = fs::read_to_string(path)?;
    let config: RunConfig = serde_json::from_str(&text)?;
    config.selection.validate()?;
    config.flat_mass.validate()?;
    log::debug!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Reads the events of one file, skipping lines that fail to parse.
fn read_events(path: &Path) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for event in EventReader::open(path)? {
        match event {
            Ok(event) => events.push(event),
            Err(fatjet_io::Error::InvalidFormat(msg)) => {
                log::warn!("{}: {}", path.display(), msg);
            }
            Err(e) => return Err(e.into()),
        }
    }
    log::debug!("{}: {} events", path.display(), events.len());
    Ok(events)
}

fn print_statistics(stats: &SelectionStatistics, elapsed_s: f64) {
    println!(
        "Selected {} of {} events in {:.2}s",
        stats.events_selected, stats.events_seen, elapsed_s
    );
    println!("Jets kept: {}", stats.jets_selected);
    if stats.events_malformed > 0 {
        println!("Malformed events skipped: {}", stats.events_malformed);
    }
}

fn write_histogram(path: &Path, flattener: &MassFlattener) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(String::new, str::to_lowercase);
    match extension.as_str() {
        "csv" => fatjet_io::write_histogram_csv_file(path, flattener.histogram())?,
        #[cfg(feature = "hdf5")]
        "h5" | "hdf5" => fatjet_io::write_mass_histogram_hdf5(path, flattener.histogram())?,
        _ => {
            return Err(CliError::Usage(format!(
                "unsupported histogram format '{}'",
                path.display()
            )))
        }
    }
    log::info!("histogram written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Select {
            input,
            output,
            process,
            max_jets,
        } => {
            let process = Process::from_sample_name(&process)?;
            let mut selection = config.selection;
            if let Some(max_jets) = max_jets {
                selection = selection.with_max_jets(max_jets);
            }
            log::info!("process: {}", process);
            log::debug!("selection: {:?}", selection);

            let start = Instant::now();
            let mut writer = SelectionWriter::create(&output)?;
            let mut runs = Vec::with_capacity(input.len());
            for path in &input {
                let events = read_events(path)?;
                let (selected, stats) = select_events(&events, process, &selection)?;
                writer.write_all(&selected)?;
                runs.push(stats);
            }
            writer.flush()?;

            print_statistics(&merge_statistics(runs), start.elapsed().as_secs_f64());
            println!("Output: {}", output.display());
        }

        Commands::FlatMass {
            input,
            output,
            max_per_bin,
            histogram,
        } => {
            let selection = config.selection;
            let start = Instant::now();

            let mut events = Vec::new();
            for path in &input {
                events.extend(read_events(path)?);
            }

            let max_per_bin = match max_per_bin {
                Some(cap) => cap,
                None => {
                    let (low, high) = REFERENCE_BIN;
                    let cap = reference_bin_count(
                        events.iter().map(|event| &event.jets),
                        &selection.cuts,
                        low,
                        high,
                    )?;
                    log::info!("jet count in {}-{} GeV bin: {}", low, high, cap);
                    cap
                }
            };

            let mut flattener = MassFlattener::new(config.flat_mass, selection.cuts, max_per_bin)?;
            let (selected, stats) = select_events_flat_mass(&events, &mut flattener, &selection)?;

            let mut writer = SelectionWriter::create(&output)?;
            writer.write_all(&selected)?;
            writer.flush()?;

            let flat = flattener.statistics();
            print_statistics(&stats, start.elapsed().as_secs_f64());
            println!("Per-bin cap: {}", max_per_bin);
            println!(
                "Candidate jets: {} accepted, {} rejected",
                flat.accepted, flat.rejected
            );
            if let Some(path) = histogram {
                write_histogram(&path, &flattener)?;
            }
        }

        Commands::Split {
            input,
            output_dir,
            mode,
        } => {
            let events = SelectionReader::open(&input)?;
            let written = split_selection(events, mode.into(), &output_dir)?;
            for (path, jets) in written {
                println!("Saved {} with {} jets.", path.display(), jets);
            }
        }

        Commands::Scaling {
            input,
            output,
            max_jets,
        } => {
            let mut scaling = FeatureScaling::new();
            if let Some(max_jets) = max_jets {
                scaling = scaling.with_max_jets(max_jets);
            }
            for event in SelectionReader::open(&input)? {
                let event = event?;
                scaling.extend(event.neurons.iter().map(Vec::as_slice))?;
                if scaling.is_full() {
                    break;
                }
            }
            if scaling.count() == 0 {
                return Err(CliError::Usage(format!(
                    "no neuron vectors in {}",
                    input.display()
                )));
            }

            let params = scaling.finish();
            fatjet_io::write_scaling_json(&output, &params)?;

            println!("Using {} jets, {} features", scaling.count(), params.n_features());
            let range = |values: &[f32]| {
                values
                    .iter()
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    })
            };
            let (mean_lo, mean_hi) = range(&params.mean);
            let (std_lo, std_hi) = range(&params.std);
            println!("Mean range: [{:.4}, {:.4}]", mean_lo, mean_hi);
            println!("Std range: [{:.4}, {:.4}]", std_lo, std_hi);
            println!("Scaling parameters saved to {}", output.display());
        }

        Commands::Info { input } => {
            let events = read_events(&input)?;
            let jets: usize = events.iter().map(|event| event.jets.len()).sum();
            let with_gen = events
                .iter()
                .filter(|event| event.gen_particles.is_some())
                .count();
            let with_cands = events.iter().filter(|event| event.pf_cands.is_some()).count();
            let with_tags = events.iter().filter(|event| event.jet_tags.is_some()).count();
            let neuron_width = events
                .iter()
                .flat_map(|event| event.neurons.first())
                .map(Vec::len)
                .next();

            println!("File: {}", input.display());
            println!("Events: {}", events.len());
            println!("Jets: {}", jets);
            println!("Events with generator record: {}", with_gen);
            println!("Events with PF candidates: {}", with_cands);
            println!("Events with jet tags: {}", with_tags);
            if let Some(width) = neuron_width {
                println!("Neuron features: {}", width);
            }

            if !events.is_empty() {
                let mass = events.iter().flat_map(|event| event.jets.mass.iter().copied());
                let (lo, hi) = mass.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), m| {
                    (lo.min(m), hi.max(m))
                });
                if lo <= hi {
                    println!("Mass range: {:.1} - {:.1} GeV", lo, hi);
                }
                println!(
                    "Mean jets per event: {:.2}",
                    jets as f64 / events.len() as f64
                );
            }
        }
    }

    Ok(())
}
