//! pfc-position CLI entry point.
//!
//! Reads an event (rechits and clusters with hit fractions), computes cluster
//! energy, layer, position and shower axis with the energy-weighted PCA
//! calculator, and writes the results as JSON.

mod event;

use anyhow::{Context, Result};
use clap::Parser;
use event::{ClusterOutput, EventFile, RunOutput};
use log::{info, warn};
use pfc_core::Cluster;
use pfc_position::{
    BatchProcessor, Cluster3DPcaCalculator, PcaCalculatorConfig, PositionCalculator,
    SampleProjection,
};
use std::io::Write;
use std::path::PathBuf;

/// pfc-position version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "pfc-position")]
#[command(version = VERSION)]
#[command(about = "Energy-weighted PCA position and axis reconstruction for particle-flow clusters", long_about = None)]
struct Args {
    /// Input event file (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Calculator configuration (TOML). Defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (JSON). Written to stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the energy represented by one PCA sample (GeV)
    #[arg(long)]
    log_weight_denominator: Option<f64>,

    /// Feed the hit x-coordinate into all three PCA variables (legacy output)
    #[arg(long)]
    legacy_x_only: bool,

    /// Process clusters on all cores
    #[arg(long)]
    parallel: bool,

    /// Report rejected clusters and continue instead of halting
    #[arg(long)]
    keep_going: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    info!("pfc-position {} - Starting", VERSION);

    let config = load_config(&args)?;
    let calculator =
        Cluster3DPcaCalculator::new(config.clone()).context("Invalid calculator configuration")?;

    let event = EventFile::from_file(&args.input)?;
    let mut clusters = event.into_clusters()?;
    info!(
        "Loaded {} clusters from {}",
        clusters.len(),
        args.input.display()
    );

    let output = if args.keep_going {
        if args.parallel {
            warn!("--parallel is ignored with --keep-going");
        }
        run_keep_going(calculator, config, &mut clusters)?
    } else {
        run_batch(calculator, config, &mut clusters, args.parallel)?
    };

    write_output(&output, args.output.as_ref())
}

fn load_config(args: &Args) -> Result<PcaCalculatorConfig> {
    let mut config = match &args.config {
        Some(path) => PcaCalculatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PcaCalculatorConfig::default(),
    };
    if let Some(denominator) = args.log_weight_denominator {
        config.log_weight_denominator = denominator;
    }
    if args.legacy_x_only {
        config.sample_projection = SampleProjection::XOnly;
    }
    info!(
        "log_weight_denominator={} projection={:?}",
        config.log_weight_denominator, config.sample_projection
    );
    Ok(config)
}

fn run_batch(
    calculator: Cluster3DPcaCalculator,
    config: PcaCalculatorConfig,
    clusters: &mut [Cluster],
    parallel: bool,
) -> Result<RunOutput> {
    let mut batch = BatchProcessor::new(calculator);
    let report = if parallel {
        batch.run_parallel(clusters)
    } else {
        batch.run(clusters)
    }
    .context("Cluster position batch failed")?;

    Ok(RunOutput {
        config,
        report: Some(report),
        rejected: 0,
        clusters: clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| ClusterOutput::accepted(index, cluster))
            .collect(),
    })
}

/// Skip clusters whose own contents are rejected; any other failure halts the run.
fn run_keep_going<C: PositionCalculator>(
    mut calculator: C,
    config: PcaCalculatorConfig,
    clusters: &mut [Cluster],
) -> Result<RunOutput> {
    let mut rejected = 0;
    let mut outputs = Vec::with_capacity(clusters.len());

    for (index, cluster) in clusters.iter_mut().enumerate() {
        match calculator.calculate_and_set_position(cluster) {
            Ok(()) => outputs.push(ClusterOutput::accepted(index, cluster)),
            Err(err) if err.is_cluster_local() => {
                warn!("cluster {} skipped: {}", index, err);
                rejected += 1;
                outputs.push(ClusterOutput::rejected(index, cluster, &err));
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Cluster {} failed", index));
            }
        }
    }

    info!("{} clusters processed, {} rejected", clusters.len(), rejected);
    Ok(RunOutput {
        config,
        report: None,
        rejected,
        clusters: outputs,
    })
}

fn write_output(output: &RunOutput, path: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Results written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }
    Ok(())
}
