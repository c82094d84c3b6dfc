use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use statescan_catalog::{Catalog, CatalogDocument, CONFIG_FILE_NAME};
use statescan_engine::{run_scan, RiskLevel, ScanOptions, DEFAULT_MAX_DEPTH};

pub mod output;
pub mod project;

#[derive(Parser)]
#[command(
    name = "state-scan",
    version,
    about = "Static analyzer for JVM artifacts that reports state hostile to horizontal scaling"
)]
struct Cli {
    /// Project directory (or a compiled-classes directory) to scan.
    target: PathBuf,

    /// Suppress findings below this severity.
    #[arg(long, value_enum)]
    risk_threshold: Option<RiskArg>,

    /// Class-FQN glob to exclude (repeatable).
    #[arg(long = "exclude")]
    excludes: Vec<String>,

    /// Override auto-detected project package prefix.
    #[arg(long)]
    package_prefix: Option<String>,

    /// User catalogue YAML, merged into the shipped defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit with code 2 when a finding at or above this severity exists.
    #[arg(long, value_enum)]
    fail_on: Option<RiskArg>,

    /// Reachability search depth.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Console)]
    format: Format,

    /// Write the report to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RiskArg {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl From<RiskArg> for RiskLevel {
    fn from(value: RiskArg) -> Self {
        match value {
            RiskArg::Critical => RiskLevel::Critical,
            RiskArg::High => RiskLevel::High,
            RiskArg::Medium => RiskLevel::Medium,
            RiskArg::Low => RiskLevel::Low,
            RiskArg::Info => RiskLevel::Info,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Console,
    Json,
    Html,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("state-scan: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let catalog = load_catalog(&cli)?;
    let classpath = project::discover_classpath(&cli.target, cli.package_prefix.clone());

    let options = ScanOptions {
        max_depth: cli.max_depth,
        risk_threshold: cli.risk_threshold.map(RiskLevel::from),
    };
    let report = run_scan(&cli.target, &classpath, &catalog, &options)
        .with_context(|| format!("scan of {} failed", cli.target.display()))?;

    let rendered = match cli.format {
        Format::Console => output::render_console(&report),
        Format::Json => output::render_json(&report)?,
        Format::Html => output::render_html(&report),
    };
    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(output::exit_code_for(&report, cli.fail_on.map(RiskLevel::from)))
}

/// Shipped defaults, plus `--config` (or an auto-detected
/// `state-scan.yaml` at the target root), plus `--exclude` globs.
fn load_catalog(cli: &Cli) -> Result<Catalog> {
    let mut catalog = Catalog::default();

    let config_path = cli
        .config
        .clone()
        .or_else(|| {
            let conventional = cli.target.join(CONFIG_FILE_NAME);
            conventional.is_file().then_some(conventional)
        });
    if let Some(path) = config_path {
        let doc = CatalogDocument::load(&path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        tracing::info!(config = %path.display(), "merged user catalogue");
        catalog.merge(doc);
    }

    for glob in &cli.excludes {
        catalog.add_exclude_glob(glob);
    }
    Ok(catalog)
}
