use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use covcheck::{
    enforcer, report, CheckOptions, CoverageReport, CoverageThresholds, DEFAULT_XML_PATH,
};

#[derive(Parser)]
#[command(name = "covcheck")]
#[command(about = "Enforce code coverage thresholds from Cobertura XML reports")]
#[command(version)]
struct Cli {
    /// Source directory to check coverage for
    #[arg(long, default_value = enforcer::DEFAULT_SOURCE_DIR)]
    source: String,

    /// Path to the coverage XML report
    #[arg(long, default_value = DEFAULT_XML_PATH)]
    xml: PathBuf,

    /// Overall line coverage threshold percentage
    #[arg(long)]
    line_threshold: Option<f64>,

    /// Overall branch coverage threshold percentage
    #[arg(long)]
    branch_threshold: Option<f64>,

    /// Module-name prefixes that require higher coverage
    #[arg(long, num_args = 0..)]
    critical_modules: Vec<String>,

    /// Don't exit with a non-zero status code if thresholds are not met
    #[arg(long)]
    no_fail: bool,

    /// Path to a TOML config file with a [thresholds] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full module coverage table
    #[arg(long)]
    report: bool,

    /// Also write the coverage table to this file
    #[arg(long)]
    report_path: Option<PathBuf>,

    /// Print the parsed coverage dataset as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let thresholds = build_thresholds(&cli)?;

    let opts = CheckOptions {
        source_dir: cli.source.clone(),
        xml_path: cli.xml.clone(),
        thresholds,
    };

    let passed = enforcer::run_coverage_check(&opts)?;

    if cli.report || cli.report_path.is_some() || cli.json {
        print_artifacts(&cli)?;
    }

    if !passed && !cli.no_fail {
        std::process::exit(1);
    }

    Ok(())
}

fn build_thresholds(cli: &Cli) -> Result<CoverageThresholds> {
    let mut thresholds = match cli.config {
        Some(ref path) => CoverageThresholds::load(path)?,
        None => CoverageThresholds::default(),
    };

    // Explicit flags override the config file
    if let Some(value) = cli.line_threshold {
        thresholds.line_threshold = value;
    }
    if let Some(value) = cli.branch_threshold {
        thresholds.branch_threshold = value;
    }
    if !cli.critical_modules.is_empty() {
        thresholds.critical_modules = cli.critical_modules.clone();
    }

    thresholds.validate()?;

    Ok(thresholds)
}

fn print_artifacts(cli: &Cli) -> Result<()> {
    let mut coverage_report = CoverageReport::new(Some(cli.xml.clone()));
    let data = coverage_report.coverage_data()?.clone();

    if cli.json {
        println!("{}", report::export_json(&data)?);
    }

    if cli.report || cli.report_path.is_some() {
        let text = report::generate_coverage_report(&data, cli.report_path.as_deref())?;
        if cli.report {
            println!("\n{}", text);
        }
        if let Some(ref path) = cli.report_path {
            println!(
                "\n{} Report written: {}",
                "📊".cyan(),
                path.display().to_string().green()
            );
        }
    }

    Ok(())
}
