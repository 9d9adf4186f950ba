//! swatinit-qc - SWATINIT quality control
//!
//! Classifies every cell of an exported grid frame and reports the water
//! volume discrepancy per QC flag.
//!
//! # Usage
//!
//! ```bash
//! # Text report on stdout
//! swatinit-qc model.json
//!
//! # Full QC table and JSON report for two regions, OPM Flow rules
//! swatinit-qc model.json --output qc.csv --report-json qc.json --eqlnum 1 --eqlnum 2 --flavour flow
//! ```
//!
//! # Environment Variables
//!
//! - `SWATINIT_QC_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)
//!
//! # Exit Status
//!
//! `0` on success, `2` when SWATINIT, SWL or SWAT is missing from the
//! simulator output, `1` on any other failure.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use swatinit_qc::config::{QcConfig, SimulatorFlavour};
use swatinit_qc::report::{write_qc_csv, QcReport};
use swatinit_qc::{GridFrame, QcEngine, QcError};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "swatinit-qc")]
#[command(about = "Quality control of SWATINIT against simulator initial water saturation")]
#[command(version)]
struct CliArgs {
    /// Grid frame JSON document exported from the simulation run
    grid_frame: PathBuf,

    /// TOML config file (overrides SWATINIT_QC_CONFIG and ./swatinit_qc.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the per-cell QC table to this CSV file
    #[arg(short, long, value_name = "CSV")]
    output: Option<PathBuf>,

    /// Write the report as JSON to this file
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,

    /// Restrict the report to these EQLNUM regions (repeatable)
    #[arg(long, value_name = "N")]
    eqlnum: Vec<u32>,

    /// Simulator that produced SWAT: eclipse or flow
    #[arg(long, env = "SWATINIT_QC_FLAVOUR")]
    flavour: Option<SimulatorFlavour>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &CliArgs) -> Result<QcConfig> {
    let mut config = match &args.config {
        Some(path) => QcConfig::load_from_file(path)
            .map_err(QcError::from)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => QcConfig::load(None),
    };
    if let Some(flavour) = args.flavour {
        config.simulator.flavour = flavour;
    }
    Ok(config)
}

fn run(args: &CliArgs) -> Result<()> {
    let config = load_config(args)?;

    let frame = GridFrame::load(&args.grid_frame)
        .with_context(|| format!("Failed to load grid frame {}", args.grid_frame.display()))?;

    let outcome = QcEngine::new(&config).run(&frame)?;
    let report = QcReport::build(&outcome, &config, &args.eqlnum);

    print!("{}", report.render_text());

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let records = outcome
            .records
            .iter()
            .filter(|r| args.eqlnum.is_empty() || args.eqlnum.contains(&r.cell.eqlnum));
        let rows = write_qc_csv(&mut BufWriter::new(file), records)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), rows, "Wrote QC table");
    }

    if let Some(path) = &args.report_json {
        let json = report.to_json().context("Failed to serialise report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote JSON report");
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            let code = e.downcast_ref::<QcError>().map_or(1, QcError::exit_code);
            ExitCode::from(code)
        }
    }
}
