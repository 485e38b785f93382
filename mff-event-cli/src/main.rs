//! MFF Event Reader CLI Application
//!
//! Command-line front end for the mff-event-decoder library. It extracts event
//! annotations from an MFF recording directory and prints a per-code summary,
//! or dumps typed ECI events as JSON for downstream tooling.

use anyhow::{Context, Result};
use clap::Parser;
use mff_event_decoder::{DecoderConfig, EventDecoder, RecordingInfo};
use std::path::{Path, PathBuf};

mod config;
mod report;

/// MFF Event Reader - Extract event annotations from EGI MFF recordings
#[derive(Parser, Debug)]
#[command(name = "mff-event-cli")]
#[command(about = "Extract and inspect events from EGI MFF recordings", long_about = None)]
#[command(version)]
struct Args {
    /// Path to an MFF recording directory
    #[arg(short, long, value_name = "DIR")]
    mff: Option<PathBuf>,

    /// Path to a single ECI event file (Events_ECI*.xml)
    #[arg(long, value_name = "FILE")]
    eci: Option<PathBuf>,

    /// Sampling rate in Hz (required with --mff unless given in the config file)
    #[arg(long, value_name = "HZ")]
    sfreq: Option<f64>,

    /// Samples per segment (enables event matrix projection)
    #[arg(long, value_name = "COUNT")]
    samples: Option<usize>,

    /// Number of concatenated segments
    #[arg(long, value_name = "COUNT")]
    segments: Option<usize>,

    /// Emit JSON instead of a human-readable summary
    #[arg(long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to a configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip events outside the recording instead of failing
    #[arg(long)]
    lenient: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Effective settings after layering command-line arguments over the
/// optional config file
struct RunOptions {
    mff_dir: Option<PathBuf>,
    sfreq: Option<f64>,
    samples: Option<usize>,
    segments: usize,
    json: bool,
    output: Option<PathBuf>,
}

impl RunOptions {
    fn resolve(args: &Args, file_config: Option<&config::AppConfig>) -> Self {
        let recording = file_config.map(|c| &c.recording);
        let output = file_config.map(|c| &c.output);
        Self {
            mff_dir: args
                .mff
                .clone()
                .or_else(|| file_config.and_then(|c| c.input.mff_dir.clone())),
            sfreq: args.sfreq.or_else(|| recording.and_then(|r| r.sfreq)),
            samples: args
                .samples
                .or_else(|| recording.and_then(|r| r.samples_per_segment)),
            segments: args
                .segments
                .or_else(|| recording.and_then(|r| r.n_segments))
                .unwrap_or(1),
            json: args.json
                || matches!(
                    output.and_then(|o| o.format),
                    Some(config::OutputFormat::Json)
                ),
            output: args
                .output
                .clone()
                .or_else(|| output.and_then(|o| o.output_file.clone())),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("MFF Event Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", mff_event_decoder::VERSION);

    let file_config = match &args.config {
        Some(path) => Some(config::load_config(path)?),
        None => None,
    };
    let options = RunOptions::resolve(&args, file_config.as_ref());

    let decoder =
        EventDecoder::with_config(DecoderConfig::new().with_strict_bounds(!args.lenient));

    if let Some(eci_path) = &args.eci {
        eci_mode(&decoder, eci_path, &options)
    } else if let Some(mff_dir) = options.mff_dir.clone() {
        mff_mode(&decoder, &mff_dir, &options)
    } else {
        println!("MFF Event Reader - No input specified");
        println!("\nQuick Start:");
        println!("  mff-event-cli --mff recording.mff --sfreq 1000");
        println!("  mff-event-cli --mff recording.mff --sfreq 1000 --samples 5000");
        println!("  mff-event-cli --eci recording.mff/Events_ECI.xml --json");
        println!("\nFor repeated runs:");
        println!("  mff-event-cli --config config.toml");
        println!("\nUse --help for more options");
        Ok(())
    }
}

/// Extract legacy events from a recording directory and report them
fn mff_mode(decoder: &EventDecoder, mff_dir: &Path, options: &RunOptions) -> Result<()> {
    let sfreq = options.sfreq.context(
        "a sampling rate is required; pass --sfreq or set recording.sfreq in the config",
    )?;

    let (table, codes) = decoder
        .read_mff_events(mff_dir, sfreq)
        .with_context(|| format!("failed to extract events from {:?}", mff_dir))?;

    // With the segment geometry known, run the full matrix projection too
    let matrix_info = match options.samples {
        Some(per_segment) => {
            let info = RecordingInfo::new(sfreq, vec![per_segment], options.segments);
            let (matrix, updated) = decoder
                .read_events(mff_dir, &info)
                .with_context(|| format!("failed to project events from {:?}", mff_dir))?;
            Some((matrix, updated))
        }
        None => None,
    };

    let rendered = if options.json {
        report::render_json(&table, &codes, matrix_info.as_ref())?
    } else {
        report::render_summary(mff_dir, sfreq, &table, &codes, matrix_info.as_ref())
    };

    write_output(&rendered, options.output.as_deref())
}

/// Parse a single ECI file and report the typed events
fn eci_mode(decoder: &EventDecoder, eci_path: &Path, options: &RunOptions) -> Result<()> {
    let events = decoder
        .read_eci_events(eci_path)
        .with_context(|| format!("failed to parse ECI events from {:?}", eci_path))?;

    let rendered = if options.json {
        serde_json::to_string_pretty(&events)?
    } else {
        report::render_eci_summary(eci_path, &events)
    };

    write_output(&rendered, options.output.as_deref())
}

fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write output file {:?}", path))?;
            log::info!("Output written to {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
