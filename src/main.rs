//! Menu Insights - CLI entry point
//!
//! `explore` prints the dataset report, `charts` writes the analysis images.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use menu_insights::charts::{ChartStyle, ImageFormat};
use menu_insights::data::{DataLoader, MalformedPolicy};
use menu_insights::report::SummaryReport;
use menu_insights::settings::RunSettings;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "menu_insights")]
#[command(about = "Nutrition analysis and business charts for a beverage menu", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dataset exploration report
    Explore {
        /// Menu CSV file
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Number of sample rows to show
        #[arg(long, default_value_t = 20)]
        sample_rows: usize,

        /// Treat malformed percentages as missing instead of failing
        #[arg(long, default_value_t = false)]
        lenient: bool,
    },
    /// Generate the analysis charts
    Charts {
        /// Menu CSV file
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Existing directory to write the charts into
        #[arg(short, long, default_value = "charts")]
        output_dir: PathBuf,

        /// Image format
        #[arg(long, value_enum, default_value_t = ImageFormat::Png)]
        format: ImageFormat,

        /// Pixels per inch
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(50..=600))]
        dpi: u32,

        /// Only run these analyses (by number, repeatable)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        only: Vec<u8>,

        /// Run analyses on the rayon thread pool
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Treat malformed percentages as missing instead of failing
        #[arg(long, default_value_t = false)]
        lenient: bool,

        /// Open the output directory when done
        #[arg(long, default_value_t = false)]
        open: bool,
    },
}

fn policy(lenient: bool) -> MalformedPolicy {
    if lenient {
        MalformedPolicy::Lenient
    } else {
        MalformedPolicy::Strict
    }
}

fn main() -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry().with(stderr_layer).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Explore {
            input,
            json,
            sample_rows,
            lenient,
        } => {
            let table = DataLoader::new(policy(lenient))
                .load(&input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            let report = SummaryReport::from_table(&table, sample_rows)
                .context("failed to build summary report")?;

            if json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
        }
        Commands::Charts {
            input,
            output_dir,
            format,
            dpi,
            only,
            parallel,
            lenient,
            open,
        } => {
            let settings = RunSettings {
                style: ChartStyle {
                    pixels_per_inch: dpi,
                    format,
                    ..ChartStyle::default()
                },
                policy: policy(lenient),
                parallel,
                only,
                ..RunSettings::new(input, output_dir)
            };

            let outcomes = settings
                .execute()
                .with_context(|| format!("failed to load {}", settings.input.display()))?;

            let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
            info!(
                generated = outcomes.len() - failed.len(),
                failed = failed.len(),
                "chart generation complete"
            );

            if open {
                if let Err(e) = open::that(&settings.output_dir) {
                    warn!(error = %e, "could not open output directory");
                }
            }

            if !failed.is_empty() {
                let names: Vec<String> = failed
                    .iter()
                    .map(|o| format!("{:02} {}", o.ordinal, o.name))
                    .collect();
                bail!("{} analyses failed: {}", failed.len(), names.join(", "));
            }
        }
    }

    Ok(())
}
