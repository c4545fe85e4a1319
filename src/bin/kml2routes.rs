//! kml2routes: convert a directory of KML tracks into route CSV and JSON.
//!
//! Usage:
//!   kml2routes [INPUT_DIR] [--csv PATH] [--json PATH] [--config FILE] [--recursive] [-v]

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;

use route_metrics::batch::convert_directory;
use route_metrics::export::{write_csv_file, write_json_file};
use route_metrics::ConverterConfig;

#[derive(Parser, Debug)]
#[command(name = "kml2routes")]
#[command(about = "Rate and classify hiking routes from KML files")]
#[command(version)]
struct Args {
    /// Directory containing KML documents (created if missing)
    input_dir: Option<PathBuf>,

    /// CSV output path
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// JSON output path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// JSON config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also convert documents in subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<ConverterConfig> {
        let mut config = match &self.config {
            Some(path) => ConverterConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ConverterConfig::default(),
        };

        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(path) = &self.csv {
            config.csv_path = path.clone();
        }
        if let Some(path) = &self.json {
            config.json_path = path.clone();
        }
        if self.recursive {
            config.recursive = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.load_config()?;
    let report = convert_directory(&config)
        .with_context(|| format!("scanning {}", config.input_dir.display()))?;

    for route in &report.routes {
        let record = &route.record;
        info!(
            "[kml2routes] {} -> '{}' {:.2} km, +{:.0} m, {:.1} h, {}, {}, [{}]",
            route.source.display(),
            record.name,
            record.length,
            record.elevation,
            record.estimated_hours(),
            record.difficulty,
            record.route_type,
            record
                .features
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if report.routes.is_empty() {
        info!(
            "[kml2routes] No routes converted from {}",
            config.input_dir.display()
        );
        return Ok(());
    }

    let records = report.records();
    write_csv_file(&config.csv_path, &records)
        .with_context(|| format!("writing {}", config.csv_path.display()))?;
    write_json_file(&config.json_path, &records)
        .with_context(|| format!("writing {}", config.json_path.display()))?;

    info!(
        "[kml2routes] {} routes written, {} documents skipped, {} diagnostics",
        records.len(),
        report.failures.len(),
        report.diagnostic_count()
    );
    Ok(())
}
