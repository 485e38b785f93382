//! Standalone MFF event dump tool
//!
//! Extracts events from an MFF recording directory and prints the per-code
//! sample table, or parses a single ECI file and prints each typed event.
//!
//! Usage:
//!   dump_events <recording.mff> [--sfreq <hz>]
//!   dump_events --eci <Events_ECI.xml>

use mff_event_decoder::EventDecoder;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: dump_events <recording.mff> [--sfreq <hz>]");
        eprintln!("       dump_events --eci <Events_ECI.xml>");
        return ExitCode::FAILURE;
    }

    let decoder = EventDecoder::new();

    if args[0] == "--eci" {
        let Some(path) = args.get(1).map(PathBuf::from) else {
            eprintln!("--eci requires a file path");
            return ExitCode::FAILURE;
        };
        match decoder.read_eci_events(&path) {
            Ok(events) => {
                println!("{} typed events:", events.len());
                for event in &events {
                    let code = event.code().unwrap_or("<uncoded>");
                    match event.duration_ns() {
                        Some(ns) => println!("  {} ({} ns)", code, ns),
                        None => println!("  {}", code),
                    }
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    } else {
        let dir = PathBuf::from(&args[0]);
        let sfreq = match args.iter().position(|a| a == "--sfreq") {
            Some(i) => match args.get(i + 1).and_then(|v| v.parse::<f64>().ok()) {
                Some(v) => v,
                None => {
                    eprintln!("--sfreq requires a numeric value");
                    return ExitCode::FAILURE;
                }
            },
            None => 1000.0,
        };

        match decoder.read_mff_events(&dir, sfreq) {
            Ok((table, codes)) => {
                println!("{} event codes at {} Hz:", codes.len(), sfreq);
                for code in &codes {
                    let samples = &table[code.as_str()];
                    let first = samples.first().copied().unwrap_or(0);
                    println!("  {:<12} {:>5} occurrences, first at sample {}", code, samples.len(), first);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    }
}
