use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use provider_dq::config::EngineConfig;
use provider_dq::export;
use provider_dq::loader;
use provider_dq::logging::init_logging;
use provider_dq::pipeline::engine::{QualityEngine, QualityReport, RosterDatasets};

#[derive(Parser)]
#[command(name = "provider_dq")]
#[command(about = "Healthcare provider roster data-quality engine")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and print a KPI summary
    Analyze {
        /// Provider roster CSV
        #[arg(long)]
        roster: PathBuf,
        /// CA license-board extract CSV
        #[arg(long)]
        ca_licenses: PathBuf,
        /// NY license-board extract CSV
        #[arg(long)]
        ny_licenses: PathBuf,
        /// NPI registry CSV
        #[arg(long)]
        npi_registry: PathBuf,
        /// Minimum pair score for duplicate linking (0-100)
        #[arg(long, default_value_t = provider_dq::config::DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: u8,
        /// Analysis date for license expiry, YYYY-MM-DD
        #[arg(long, default_value = provider_dq::config::DEFAULT_CUTOFF_DATE)]
        cutoff_date: String,
        /// TOML config file; overrides --threshold and --cutoff-date
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory to write CSV reports into (skipped when absent)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Run only the deduplication pipeline and print clusters
    Dedupe {
        /// Provider roster CSV
        #[arg(long)]
        roster: PathBuf,
        /// Minimum pair score for duplicate linking (0-100)
        #[arg(long, default_value_t = provider_dq::config::DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: u8,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            roster,
            ca_licenses,
            ny_licenses,
            npi_registry,
            threshold,
            cutoff_date,
            config,
            output_dir,
        } => {
            let config = match config {
                Some(path) => EngineConfig::load(&path.to_string_lossy())?,
                None => EngineConfig::new(threshold, &cutoff_date)?,
            };
            let datasets =
                loader::load_datasets(&roster, &ca_licenses, &ny_licenses, &npi_registry)?;
            let engine = QualityEngine::with_default_scorer(config)?;

            info!("running full analysis");
            let report = engine.run(&datasets)?;
            print_summary(&report);

            if let Some(dir) = output_dir {
                fs::create_dir_all(&dir)?;
                let flag_path = dir.join("validation_flags.csv");
                let cluster_path = dir.join("duplicate_clusters.csv");
                export::write_flag_report(&flag_path, &datasets.roster, &report)?;
                export::write_cluster_report(&cluster_path, &datasets.roster, &report)?;
                println!("\n📥 Reports written:");
                println!("   {}", flag_path.display());
                println!("   {}", cluster_path.display());
            }
        }
        Commands::Dedupe { roster, threshold } => {
            let config = EngineConfig::new(threshold, provider_dq::config::DEFAULT_CUTOFF_DATE)?;
            let datasets = RosterDatasets {
                roster: loader::load_roster(&roster)?,
                ..Default::default()
            };
            let engine = QualityEngine::with_default_scorer(config)?;

            info!("running deduplication only");
            let report = engine.run(&datasets)?;

            println!(
                "\n👥 Found {} potential duplicate cluster(s) at threshold {}:",
                report.clusters.len(),
                threshold
            );
            for (i, cluster) in report.clusters.iter().enumerate() {
                println!("   Cluster {}: {}", i + 1, cluster.members.join(", "));
            }
            if report.malformed_rows > 0 {
                println!(
                    "   ({} record(s) skipped: missing surname or specialty)",
                    report.malformed_rows
                );
            }
        }
    }

    Ok(())
}

fn print_summary(report: &QualityReport) {
    println!("\n📊 Provider Data Quality Report");
    println!("   Providers analyzed:   {}", report.total_providers);
    println!("   Quality score:        {:.2}%", report.quality_score);
    println!("   Total issues:         {}", report.total_issues());
    println!();
    println!("   Duplicate clusters:   {}", report.clusters.len());
    println!("   Duplicate records:    {}", report.duplicate_records);
    println!("   Expired licenses:     {}", report.flag_counts.expired_license);
    println!("   Invalid licenses:     {}", report.flag_counts.invalid_license);
    println!("   Missing NPIs:         {}", report.flag_counts.missing_npi);
    println!("   Malformed phones:     {}", report.flag_counts.malformed_phone);

    if report.malformed_rows > 0 {
        println!(
            "\n⚠️  {} record(s) excluded from duplicate comparison (missing surname or specialty)",
            report.malformed_rows
        );
    }
}
