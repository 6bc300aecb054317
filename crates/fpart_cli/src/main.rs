//! fpart CLI — partitions a hypergraph-described circuit across a fixed set
//! of interconnected FPGA devices.
//!
//! Reads a problem file, runs the partitioning engine, writes the per-node
//! assignment, and reports diagnostics, a placement summary, and per-stage
//! timings.

#![warn(missing_docs)]

mod config;
mod report;

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use fpart_diagnostics::{DiagnosticSink, Severity};

use crate::config::{load_config, SummaryFormat, ToolConfig};
use crate::report::StageTimings;

/// fpart — a multi-FPGA circuit partitioner.
#[derive(Parser, Debug)]
#[command(name = "fpart", version, about = "Multi-FPGA circuit partitioner")]
pub struct Cli {
    /// Input problem file.
    pub input: PathBuf,

    /// Output assignment file.
    pub output: PathBuf,

    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print engine notes in addition to warnings.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a custom `fpart.toml` configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the summary format from the configuration.
    #[arg(long, value_enum)]
    pub format: Option<SummaryFormat>,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Runs the read → partition → write pipeline and returns the exit code.
fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let tool_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ToolConfig::default(),
    };
    let format = cli.format.unwrap_or(tool_config.report.format);

    if !cli.quiet {
        println!("Reading {}...", cli.input.display());
    }
    let read_start = Instant::now();
    let instance = fpart_io::read_instance(&cli.input)?;
    let read = read_start.elapsed();

    if !cli.quiet {
        println!(
            "Partitioning {} node(s) across {} device(s)...",
            instance.node_count(),
            instance.device_count()
        );
    }
    let sink = DiagnosticSink::new();
    let partition_start = Instant::now();
    let result = fpart_engine::partition(&instance, &sink);
    let partition = partition_start.elapsed();

    if !cli.quiet {
        println!("Writing {}...", cli.output.display());
    }
    let write_start = Instant::now();
    fpart_io::write_assignment(&cli.output, &result.assignments)?;
    let write = write_start.elapsed();

    let min_severity = if cli.quiet {
        Severity::Error
    } else if cli.verbose {
        Severity::Note
    } else {
        Severity::Warning
    };
    for diag in sink.take_all() {
        if diag.severity >= min_severity {
            eprintln!("{diag}");
        }
    }

    let timings = StageTimings {
        read,
        partition,
        write,
    };
    match format {
        SummaryFormat::Json => println!("{}", report::render_json(&result.summary, &timings)),
        SummaryFormat::Text if !cli.quiet => {
            print!("{}", report::render_text(&result.summary));
            if tool_config.report.timing {
                print!("{}", report::render_timings(&timings));
            }
        }
        SummaryFormat::Text => {}
    }

    if tool_config.partition.strict && result.summary.fallback_placed > 0 {
        return Ok(2);
    }
    Ok(0)
}
